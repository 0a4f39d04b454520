use reqwest::{Client, RequestBuilder, StatusCode, Url};

use crate::{
    config::Config,
    types::{ClientAuth, Session, TokenResponse},
};

/// Failures talking to the Spotify accounts service.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token endpoint answered with a non-2xx status.
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// No response at all: connect error or timeout.
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response that is not a usable token payload.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("invalid authorize url: {0}")]
    InvalidUrl(String),
}

impl AuthError {
    /// Text shown to the browser when the code exchange fails.
    ///
    /// For a rejection this is the provider's own error body, verbatim.
    pub fn provider_body(&self) -> String {
        match self {
            Self::Rejected { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Builds the Spotify authorization URL the browser is redirected to.
///
/// Carries `client_id`, `response_type=code`, the registered `redirect_uri`
/// exactly as configured, the requested `scope` and the CSRF `state` token.
///
/// # Errors
///
/// Fails only when the configured authorize endpoint is not a valid URL.
///
/// # Example
///
/// ```
/// let url = authorize_url(&config, "k3Jd9...state")?;
/// // https://accounts.spotify.com/authorize?client_id=...&response_type=code&...
/// ```
pub fn authorize_url(config: &Config, state: &str) -> Result<String, AuthError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", config.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;

    Ok(url.into())
}

/// Exchanges an authorization code for a fresh [`Session`].
///
/// Posts a form-encoded `authorization_code` grant to the token endpoint,
/// authenticating the client according to [`Config::token_auth`]. The new
/// session expires `expires_in` seconds after `now`.
///
/// # Errors
///
/// - [`AuthError::Rejected`] when Spotify refuses the code (expired, reused,
///   redirect URI mismatch, bad client credentials)
/// - [`AuthError::Transport`] on network failure or timeout
/// - [`AuthError::InvalidResponse`] when the payload lacks a refresh token
///   or cannot be parsed
pub async fn exchange_code(
    client: &Client,
    config: &Config,
    code: &str,
    now: i64,
) -> Result<Session, AuthError> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let token = request_token(client, config, &form).await?;
    let refresh_token = token
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidResponse("missing refresh_token".into()))?;

    Ok(Session {
        expires_at: expires_at(now, token.expires_in)?,
        access_token: token.access_token,
        refresh_token,
    })
}

/// Mints a new access token from the session's refresh token.
///
/// Spotify rotates refresh tokens at its discretion: when the response
/// carries one it replaces the stored token, otherwise the old one is kept.
///
/// # Errors
///
/// Same conditions as [`exchange_code`]. A revoked or expired refresh token
/// surfaces as [`AuthError::Rejected`].
pub async fn refresh_token(
    client: &Client,
    config: &Config,
    session: &Session,
    now: i64,
) -> Result<Session, AuthError> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", session.refresh_token.as_str()),
    ];

    let token = request_token(client, config, &form).await?;

    Ok(Session {
        expires_at: expires_at(now, token.expires_in)?,
        access_token: token.access_token,
        refresh_token: token
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| session.refresh_token.clone()),
    })
}

async fn request_token(
    client: &Client,
    config: &Config,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let res = with_client_auth(client.post(&config.token_url), config, form)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::Rejected { status, body });
    }

    let token: TokenResponse = res
        .json()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    if token.access_token.is_empty() {
        return Err(AuthError::InvalidResponse("empty access_token".into()));
    }
    if token.expires_in <= 0 {
        return Err(AuthError::InvalidResponse(format!(
            "non-positive expires_in: {}",
            token.expires_in
        )));
    }

    Ok(token)
}

fn expires_at(now: i64, expires_in: i64) -> Result<i64, AuthError> {
    now.checked_add(expires_in)
        .ok_or_else(|| AuthError::InvalidResponse(format!("expires_in out of range: {}", expires_in)))
}

fn with_client_auth(
    request: RequestBuilder,
    config: &Config,
    form: &[(&str, &str)],
) -> RequestBuilder {
    match config.token_auth {
        ClientAuth::Basic => request
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(form),
        ClientAuth::Body => {
            let mut fields = form.to_vec();
            fields.push(("client_id", config.client_id.as_str()));
            fields.push(("client_secret", config.client_secret.as_str()));
            request.form(&fields)
        }
    }
}
