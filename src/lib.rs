//! nscall: namespace-resolving command-line front end.
//!
//! Splits a raw argument vector into a positional prefix and keyword
//! units, resolves the prefix against a namespace tree, coerces every
//! argument token into a typed literal and hands the result to a callable
//! or a launcher script.

pub mod cli;
pub mod core;
pub mod registry;
pub mod transport;
