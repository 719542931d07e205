//! nscall CLI: call namespaced commands with typed arguments.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "nscall",
    version,
    about = "Call namespaced commands with literal-typed arguments"
)]
struct Cli {
    #[command(flatten)]
    args: nscall::cli::RunArgs,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NSCALL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match nscall::cli::dispatch(cli.args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
