//! Command resolution and argument parsing engine.

pub mod engine;
pub mod error;
pub mod joiner;
pub mod keyword;
pub mod literal;
pub mod partition;
pub mod resolver;
pub mod types;
