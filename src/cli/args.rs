//! Command-line argument parsing for the sessionkit CLI.

use clap::{Parser, Subcommand};

use crate::config::{ENV_BASE_URL, ENV_CREDENTIALS_PATH};
use crate::traits::Method;

/// Parsed command line.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "sessionkit",
    version,
    about = "Log in to an API and make authenticated requests"
)]
pub struct Cli {
    /// API base URL
    #[arg(long, global = true, env = ENV_BASE_URL)]
    pub base_url: Option<String>,

    /// Credentials file
    #[arg(long, global = true, env = ENV_CREDENTIALS_PATH)]
    pub credentials: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// CLI command to execute.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Log in and store the session
    Login {
        /// Account identifier; prompted for when absent
        #[arg(short, long)]
        identifier: Option<String>,

        /// Challenge token issued by the server, if it asks for one
        #[arg(long)]
        challenge_token: Option<String>,
    },
    /// End the session
    Logout,
    /// Show whether the stored session is usable
    Status,
    /// Fetch and print the current user's profile
    Whoami,
    /// Send an authenticated request and print the response
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: Method,

        /// Path relative to the base URL, or an absolute URL
        path: String,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_login() {
        let cli = parse(&["sessionkit", "login", "--identifier", "alice"]);
        assert_eq!(
            cli.command,
            CliCommand::Login {
                identifier: Some("alice".to_string()),
                challenge_token: None,
            }
        );
    }

    #[test]
    fn test_parse_login_with_challenge() {
        let cli = parse(&["sessionkit", "login", "-i", "bob", "--challenge-token", "c1"]);
        assert_eq!(
            cli.command,
            CliCommand::Login {
                identifier: Some("bob".to_string()),
                challenge_token: Some("c1".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(&["sessionkit", "logout"]).command, CliCommand::Logout);
        assert_eq!(parse(&["sessionkit", "status"]).command, CliCommand::Status);
        assert_eq!(parse(&["sessionkit", "whoami"]).command, CliCommand::Whoami);
    }

    #[test]
    fn test_parse_request() {
        let cli = parse(&["sessionkit", "request", "post", "/items", "--data", "{}"]);
        assert_eq!(
            cli.command,
            CliCommand::Request {
                method: Method::Post,
                path: "/items".to_string(),
                data: Some("{}".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_global_base_url() {
        let cli = parse(&["sessionkit", "status", "--base-url", "https://api.example.com"]);
        assert_eq!(cli.base_url.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn test_rejects_unknown_method() {
        assert!(Cli::try_parse_from(["sessionkit", "request", "TRACE", "/x"]).is_err());
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["sessionkit"]).is_err());
    }
}
