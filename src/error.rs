use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Request-level failures of the auth proxy.
///
/// Every variant is handled at the request boundary; none of them reach the
/// process. Upstream non-2xx responses are not errors here: those are
/// relayed to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// State or code missing, state mismatch, or the provider reported an error.
    /// The reason is for logs only; the browser always sees the same message.
    #[error("invalid handshake: {0}")]
    InvalidHandshake(String),

    /// Provider rejected the authorization code. Carries the provider's body.
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// No usable session: cookie absent, unverifiable, or refresh failed.
    #[error("unauthorized")]
    Unauthorized,

    #[error("missing ids")]
    MissingIds,

    #[error("invalid type")]
    InvalidType,

    #[error("origin not allowed")]
    OriginNotAllowed,

    /// Resource call never produced a response (connect error, timeout).
    #[error("upstream request failed")]
    Upstream(#[source] reqwest::Error),

    /// Misconfiguration discovered while serving a request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidHandshake(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid state/code. Please log in again: /login",
            )
                .into_response(),
            Self::TokenExchangeFailed(body) => (StatusCode::BAD_REQUEST, body).into_response(),
            Self::Unauthorized => json_error(StatusCode::UNAUTHORIZED, &self),
            Self::MissingIds | Self::InvalidType | Self::Upstream(_) => {
                json_error(StatusCode::BAD_REQUEST, &self)
            }
            Self::OriginNotAllowed => json_error(StatusCode::FORBIDDEN, &self),
            Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

fn json_error(status: StatusCode, err: &ProxyError) -> Response {
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
