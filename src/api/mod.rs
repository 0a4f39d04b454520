//! # API Module
//!
//! HTTP endpoints of the Roomify auth proxy. The browser only ever talks to
//! these handlers; Spotify credentials never leave the server except inside
//! the signed session cookie.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /login`, redirects to Spotify's authorize page and sets
//!   the `oauth_state` cookie
//! - [`callback`] - `GET /callback`, checks `state` against the cookie,
//!   exchanges the code and stores the session
//! - [`logout`] - `POST /logout`, clears the session cookie
//!
//! ### Resource Proxy
//!
//! | Route | Spotify |
//! |---|---|
//! | [`me`] | `/v1/me` |
//! | [`top_artists`] | `/v1/me/top/artists` |
//! | [`top_tracks`] | `/v1/me/top/tracks` |
//! | [`top_by_type`] | `/v1/me/top/{type}` |
//! | [`saved_albums`] | `/v1/me/albums` |
//! | [`multiple_artists`] | `/v1/artists` |
//! | [`multiple_tracks`] | `/v1/tracks` |
//! | [`multiple_albums`] | `/v1/albums` |
//!
//! Every proxy route goes through [`proxy_call`]: the session is refreshed
//! at most once, before the upstream call, and Spotify's status and body are
//! relayed unchanged.
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`, version and session presence
//!
//! ## Error Responses
//!
//! Failures are rendered by [`ProxyError`](crate::error::ProxyError): plain
//! text with a link back to `/login` for handshake failures, small JSON
//! bodies such as `{"error":"unauthorized"}` for API routes.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use roomify::{config::Config, server::{AppState, router}};
//!
//! let state = AppState::new(Config::from_env()?)?;
//! let app = router(state);
//! ```

mod auth;
mod cookies;
mod health;
mod proxy;

pub use auth::{callback, login, logout, verify_handshake};
pub use cookies::STATE_COOKIE_NAME;
pub use health::health;
pub use proxy::{
    me, multiple_albums, multiple_artists, multiple_tracks, proxy_call, saved_albums,
    top_artists, top_by_type, top_tracks,
};
