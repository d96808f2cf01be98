//! CLI module for sessionkit.
//!
//! This module provides the command-line front end:
//! - Argument parsing (clap)
//! - One handler per command, built on [`crate::auth::SessionClient`]
//!
//! # Usage
//!
//! ```ignore
//! use clap::Parser;
//! use sessionkit::cli::{run_cli_command, Cli};
//!
//! let cli = Cli::parse();
//! let succeeded = run_cli_command(cli).await?;
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, CliCommand};

use color_eyre::eyre::{Result, WrapErr};
use tracing::debug;

use crate::auth::SessionClient;
use crate::config::ClientConfig;

/// Build the client configuration for a parsed command line.
///
/// Environment variables supply the defaults; `--base-url` and
/// `--credentials` win over them.
pub fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().wrap_err("Invalid configuration")?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(path) = &cli.credentials {
        config = config.with_credentials_path(path.clone());
    }
    Ok(config)
}

/// Run a parsed command against a real session.
///
/// Returns whether the command succeeded.
pub async fn run_cli_command(cli: Cli) -> Result<bool> {
    let config = build_config(&cli)?;
    debug!(base_url = %config.base_url, credentials = %config.credentials_path.display(), "Starting");
    let client = SessionClient::from_config(config)?;
    let mut out = std::io::stdout();

    match cli.command {
        CliCommand::Login {
            identifier,
            challenge_token,
        } => {
            let identifier = match identifier {
                Some(identifier) => identifier,
                None => commands::prompt_identifier()?,
            };
            let secret = commands::read_secret()?;
            commands::handle_login(
                &client,
                &identifier,
                &secret,
                challenge_token.as_deref(),
                &mut out,
            )
            .await
        }
        CliCommand::Logout => commands::handle_logout(&client, &mut out).await,
        CliCommand::Status => commands::handle_status(&client, &mut out).await,
        CliCommand::Whoami => commands::handle_whoami(&client, &mut out).await,
        CliCommand::Request { method, path, data } => {
            commands::handle_request(&client, method, &path, data.as_deref(), &mut out).await
        }
    }
}
