//! Handlers for each CLI command.
//!
//! Every handler writes its output to the given writer so the same code
//! serves the binary (stdout) and the tests (a buffer), and returns whether
//! the command succeeded.

use std::io::{self, BufRead, Write};

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::auth::{jwt, ApiRequest, SessionClient, SessionStatus};
use crate::error::AuthError;
use crate::traits::Method;

/// Environment variable holding the login secret for non-interactive use.
pub const ENV_SECRET: &str = "SESSIONKIT_SECRET";

/// Log in with `identifier` and `secret`.
pub async fn handle_login<W: Write>(
    client: &SessionClient,
    identifier: &str,
    secret: &str,
    challenge_token: Option<&str>,
    out: &mut W,
) -> Result<bool> {
    match client.login(identifier, secret, challenge_token).await {
        Ok(profile) => {
            match profile {
                Some(profile) => writeln!(out, "Logged in as {}", profile.label())?,
                None => writeln!(out, "Logged in")?,
            }
            Ok(true)
        }
        Err(e @ AuthError::InvalidCredentials { .. }) => {
            writeln!(out, "{}", e.user_message())?;
            Ok(false)
        }
        Err(e) => Err(e).wrap_err("Login failed"),
    }
}

pub async fn handle_logout<W: Write>(client: &SessionClient, out: &mut W) -> Result<bool> {
    client.logout().await.wrap_err("Could not clear the stored session")?;
    writeln!(out, "Logged out")?;
    Ok(true)
}

pub async fn handle_status<W: Write>(client: &SessionClient, out: &mut W) -> Result<bool> {
    let status = client.status().await?;
    writeln!(out, "Status: {}", status)?;

    if status == SessionStatus::Authenticated {
        if let Some(secs) = client
            .access_token()?
            .as_deref()
            .and_then(jwt::seconds_until_expiry)
        {
            writeln!(out, "Access token expires in {}s", secs)?;
        }
        if let Some(profile) = client.profile()? {
            writeln!(out, "User: {}", profile.label())?;
        }
        Ok(true)
    } else {
        Ok(false)
    }
}

pub async fn handle_whoami<W: Write>(client: &SessionClient, out: &mut W) -> Result<bool> {
    match client.fetch_profile().await {
        Ok(profile) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&profile)?)?;
            Ok(true)
        }
        Err(e) if e.requires_reauth() => session_expired(out),
        Err(e) => Err(e).wrap_err("Could not fetch profile"),
    }
}

pub async fn handle_request<W: Write>(
    client: &SessionClient,
    method: Method,
    path: &str,
    data: Option<&str>,
    out: &mut W,
) -> Result<bool> {
    let mut request = ApiRequest::new(method, path);
    if let Some(data) = data {
        let body: serde_json::Value =
            serde_json::from_str(data).wrap_err("--data is not valid JSON")?;
        request = request.json(body);
    }

    match client.authenticated_request(request).await {
        Ok(response) => {
            writeln!(out, "HTTP {}", response.status)?;
            let text = response.text_lossy();
            if !text.is_empty() {
                writeln!(out, "{}", text)?;
            }
            Ok(response.is_success())
        }
        Err(AuthError::SessionExpired) => session_expired(out),
        Err(e) => Err(e).wrap_err(format!("{} {} failed", method, path)),
    }
}

fn session_expired<W: Write>(out: &mut W) -> Result<bool> {
    writeln!(out, "{}", AuthError::SessionExpired.user_message())?;
    writeln!(out, "Run `sessionkit login` to start a new session.")?;
    Ok(false)
}

/// Ask for the account identifier on stdin.
pub fn prompt_identifier() -> Result<String> {
    print!("Identifier: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let identifier = line.trim().to_string();
    if identifier.is_empty() {
        return Err(eyre!("An identifier is required"));
    }
    Ok(identifier)
}

/// The login secret from the environment, or a hidden prompt.
pub fn read_secret() -> Result<String> {
    if let Ok(secret) = std::env::var(ENV_SECRET) {
        if !secret.is_empty() {
            return Ok(secret);
        }
    }
    rpassword::prompt_password("Secret: ").wrap_err("Could not read secret")
}
