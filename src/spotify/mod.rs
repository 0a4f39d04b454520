//! # Spotify Integration Module
//!
//! Outbound side of the proxy: everything that talks to Spotify lives here,
//! split by the two services Spotify exposes.
//!
//! ```text
//! Request handlers (api)
//!          ↓
//! Token policy (management::TokenManager)
//!          ↓
//! Spotify Integration Layer
//!     ├── auth       accounts.spotify.com  (/authorize, /api/token)
//!     └── resources  api.spotify.com       (/v1/me, /v1/me/top/*, /v1/{artists,tracks,albums})
//!          ↓
//! HTTP Layer (reqwest, shared client with timeout)
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the server side of the OAuth 2.0 Authorization Code
//! flow with a confidential client:
//! - **Authorize URL**: built from the configured client id, redirect URI,
//!   scope and a per-login CSRF `state`
//! - **Code Exchange**: form-encoded `authorization_code` grant
//! - **Refresh**: form-encoded `refresh_token` grant, keeping the previous
//!   refresh token when Spotify does not rotate it
//! - **Client Authentication**: HTTP Basic or body fields, selected by
//!   [`ClientAuth`](crate::types::ClientAuth)
//!
//! ## Resources
//!
//! [`resources`] performs bearer-authenticated GETs and hands back the status
//! and body untouched. It never interprets Spotify's JSON; the frontend does.
//!
//! ## Error Handling
//!
//! - **`auth::AuthError`** - token endpoint rejections, transport failures,
//!   malformed token payloads
//! - **`reqwest::Error`** - transport failures of resource calls
//!
//! Neither layer retries. Timeouts come from the shared `reqwest::Client`
//! and follow the same path as any other failed call.

pub mod auth;
pub mod resources;
