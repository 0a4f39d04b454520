//! Roomify Auth Proxy Library
//!
//! Server side of Roomify: runs the Spotify OAuth 2.0 Authorization Code flow
//! for a browser frontend, keeps the resulting tokens in a signed cookie and
//! forwards authenticated calls to the Spotify Web API, refreshing the access
//! token shortly before it expires.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for login, callback, logout and the resource proxy
//! - `config` - Configuration management and environment variables
//! - `error` - Request-level error taxonomy and its HTTP rendering
//! - `management` - Session storage and the token refresh policy
//! - `server` - Router, cross-origin policy and listener
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use roomify::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> roomify::Res<()> {
//!     config::load_env().await?;
//!     server::start_api_server(config::Config::from_env()?, |_| {}).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed-error result used at startup and in the binary.
///
/// Request handlers never return it; they render
/// [`ProxyError`](crate::error::ProxyError) instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Console line prefixed with a blue `o`, for routine events such as a
/// token refresh.
///
/// ```
/// info!("Refreshed access token, valid until {}", expires_at);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Console line prefixed with a green `✓`: server started, login completed.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints with a red `!` and exits with status 1.
///
/// Only for startup failures (bad configuration, unbindable address). Never
/// used while serving a request.
///
/// ```
/// error!("Invalid configuration: {}", e);
/// // unreachable
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Console line prefixed with a yellow `!` for rejected requests and
/// recoverable failures: state mismatch, failed exchange or refresh, blocked
/// origin. Token values are never passed to it.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
