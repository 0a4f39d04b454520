//! Configuration management for the Roomify auth proxy.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and freezes them into a [`Config`] that is handed to the
//! server at startup. Nothing outside this module reads the environment, so
//! handlers can be exercised with fake credentials and endpoints.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use rand::{Rng, distr::Alphanumeric};

use crate::{types::ClientAuth, warning};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_SCOPE: &str = "user-read-email user-top-read user-library-read";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

const MIN_REFRESH_MARGIN: i64 = 10;
const MAX_REFRESH_MARGIN: i64 = 30;

/// Loads environment variables from `.env` files.
///
/// Looks first in the platform-specific local data directory under
/// `roomify/.env`, then in the current working directory. Variables that are
/// already set in the process environment are never overwritten, and a
/// missing file is not an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/roomify/.env`
/// - macOS: `~/Library/Application Support/roomify/.env`
/// - Windows: `%LOCALAPPDATA%/roomify/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("roomify/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Immutable process-wide configuration.
///
/// Built once at startup by [`Config::from_env`] and shared read-only with
/// every request handler.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the URI registered with Spotify byte for byte.
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    /// Resource API origin; upstream paths such as `/v1/me` are appended.
    pub api_url: String,
    pub token_auth: ClientAuth,
    pub server_addr: String,
    /// Where the browser lands after a successful login.
    pub frontend_url: String,
    pub allowed_origins: Vec<String>,
    pub session_secret: Vec<u8>,
    pub secure_cookies: bool,
    /// Seconds before `expires_at` at which a token is already treated as stale.
    pub refresh_margin: i64,
    pub http_timeout: Duration,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Required Variables
    ///
    /// - `SPOTIFY_API_AUTH_CLIENT_ID`
    /// - `SPOTIFY_API_AUTH_CLIENT_SECRET`
    /// - `SPOTIFY_API_REDIRECT_URI`
    ///
    /// Everything else falls back to a default. Without `SESSION_SECRET` a
    /// random key is generated, so sessions do not survive a restart.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, String> {
        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ => {
                warning!("SESSION_SECRET is not set, using an ephemeral key");
                generate_secret()
            }
        };

        let token_auth = match optional("SPOTIFY_TOKEN_AUTH").as_deref() {
            None | Some("basic") => ClientAuth::Basic,
            Some("body") => ClientAuth::Body,
            Some(other) => {
                return Err(format!(
                    "SPOTIFY_TOKEN_AUTH must be \"basic\" or \"body\", got \"{}\"",
                    other
                ));
            }
        };

        let allowed_origins = match optional("ALLOWED_ORIGINS") {
            Some(list) => parse_origins(&list),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let refresh_margin = match optional("REFRESH_MARGIN_SECS") {
            Some(v) => v
                .parse::<i64>()
                .map_err(|e| format!("REFRESH_MARGIN_SECS: {}", e))?,
            None => MIN_REFRESH_MARGIN,
        };

        let http_timeout = match optional("HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|e| format!("HTTP_TIMEOUT_SECS: {}", e))?,
            None => 10,
        };

        Ok(Self {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: optional("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.into()),
            auth_url: optional("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
            token_url: optional("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            api_url: optional("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            token_auth,
            server_addr: optional("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into()),
            frontend_url: optional("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.into()),
            allowed_origins,
            session_secret,
            secure_cookies: matches!(optional("COOKIE_SECURE").as_deref(), Some("1" | "true")),
            refresh_margin: clamp_margin(refresh_margin),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}

/// Keeps the refresh margin inside the 10–30 second window.
pub fn clamp_margin(margin: i64) -> i64 {
    margin.clamp(MIN_REFRESH_MARGIN, MAX_REFRESH_MARGIN)
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn required(key: &str) -> Result<String, String> {
    optional(key).ok_or_else(|| format!("{} must be set", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn generate_secret() -> Vec<u8> {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .collect()
}
