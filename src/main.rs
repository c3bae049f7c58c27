//! Binary entry point for docent-rs.
//!
//! Parses arguments, initializes tracing to stderr, dispatches to the
//! command layer, and maps errors to a non-zero exit code.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docent_rs::cli::{Cli, execute};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "docent_rs=debug"
    } else {
        "docent_rs=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match execute(&cli) {
        Ok(out) => {
            if !out.is_empty() {
                let _ = write!(std::io::stdout(), "{out}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "Error: {e}");
            ExitCode::FAILURE
        }
    }
}
