use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Value, json};

use super::cookies;
use crate::{
    error::ProxyError,
    server::AppState,
    spotify, success,
    types::{CallbackParams, Session},
    utils, warning,
};

/// `GET /login`: issues a fresh CSRF state and sends the browser to Spotify.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let oauth_state = utils::generate_state();

    let url = match spotify::auth::authorize_url(&state.config, &oauth_state) {
        Ok(url) => url,
        Err(e) => return ProxyError::Internal(e.to_string()).into_response(),
    };

    let jar = jar.add(cookies::state_cookie(
        &oauth_state,
        state.config.secure_cookies,
    ));

    (jar, found(url)).into_response()
}

/// `GET /callback`: completes the handshake and stores the session.
///
/// The `oauth_state` cookie is single use and is cleared whatever the
/// outcome, including a query string that does not parse.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let cookie_state = cookies::get_state(&jar);
    let jar = cookies::clear_state(jar);

    let result = match query {
        Ok(Query(params)) => complete_authorization(&state, &params, cookie_state.as_deref()).await,
        Err(rejection) => Err(ProxyError::InvalidHandshake(rejection.body_text())),
    };

    match result {
        Ok(session) => {
            let jar = state.store.write(jar, &session);
            success!("Login completed, session valid until {}", session.expires_at);
            (jar, found(state.config.frontend_url.clone())).into_response()
        }
        Err(e) => {
            warning!("Callback rejected: {}", e);
            (jar, e).into_response()
        }
    }
}

/// `POST /logout`: drops the session cookie. Safe to call without one.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    (state.store.clear(jar), Json(json!({ "ok": true })))
}

async fn complete_authorization(
    state: &AppState,
    params: &CallbackParams,
    cookie_state: Option<&str>,
) -> Result<Session, ProxyError> {
    let code = verify_handshake(params, cookie_state)?;

    spotify::auth::exchange_code(&state.client, &state.config, code, utils::now())
        .await
        .map_err(|e| ProxyError::TokenExchangeFailed(e.provider_body()))
}

/// Returns the authorization code once `state` matches the cookie exactly.
///
/// Any missing piece is a mismatch; the token endpoint is never reached.
pub fn verify_handshake<'a>(
    params: &'a CallbackParams,
    cookie_state: Option<&str>,
) -> Result<&'a str, ProxyError> {
    if let Some(error) = &params.error {
        return Err(ProxyError::InvalidHandshake(format!(
            "authorization denied: {}",
            error
        )));
    }

    match (params.code.as_deref(), params.state.as_deref(), cookie_state) {
        (Some(code), Some(received), Some(expected))
            if !code.is_empty() && !received.is_empty() && received == expected =>
        {
            Ok(code)
        }
        _ => Err(ProxyError::InvalidHandshake("state/code mismatch".into())),
    }
}

fn found(location: String) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}
