use axum::{extract::State, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Value, json};

use crate::server::AppState;

/// Liveness probe. `session` tells the frontend whether a signed session
/// cookie is present without spending a Spotify call on it.
pub async fn health(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "session": state.store.read(&jar).is_some(),
    }))
}
