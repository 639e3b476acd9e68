//! CLI entry point for exhume.

use std::error::Error;
use std::process::ExitCode;

use exhume::cli;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // WARN unless RUST_LOG says otherwise; stdout is reserved for selected values
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            // Skip causes the top-level message already spells out
            let mut source = e.source();
            while let Some(cause) = source {
                if !e.to_string().contains(&cause.to_string()) {
                    eprintln!("  caused by: {cause}");
                }
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
