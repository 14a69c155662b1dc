//! Bucketlock CLI.
//!
//! This is the main entry point for the `bucketlock` binary. It parses
//! arguments, sets up logging, dispatches to the command handler, and maps the
//! outcome to an exit code.

mod cli;
mod commands;

use bucketlock::exit_codes;
use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    match commands::dispatch(cli) {
        Ok(true) => ExitCode::from(exit_codes::SUCCESS as u8),
        Ok(false) => ExitCode::from(exit_codes::LOCK_HELD as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Install a stderr subscriber. `-v` flags win over `RUST_LOG`; without
/// either, only warnings are shown.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
