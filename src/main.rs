use std::io;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sessionkit::cli::{run_cli_command, Cli};

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (e.g. `RUST_LOG=sessionkit=debug`); the
/// default only shows warnings. Logs go to stderr so command output on
/// stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    if run_cli_command(cli).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
