use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::ProxyError,
    server::AppState,
    spotify::resources::{self, UpstreamResponse},
    types::{IdsParams, LimitParams, TopByTypeParams, TopParams},
    utils, warning,
};

const DEFAULT_LIMIT: &str = "10";
const DEFAULT_TOP_LIMIT: &str = "20";
const DEFAULT_TERM: &str = "medium_term";

pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Response {
    proxy_call(&state, jar, resources::ME, &[]).await
}

pub async fn top_artists(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TopParams>,
) -> Response {
    top(&state, jar, resources::TOP_ARTISTS, &params).await
}

pub async fn top_tracks(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TopParams>,
) -> Response {
    top(&state, jar, resources::TOP_TRACKS, &params).await
}

/// `GET /api/me/top?type=artists|tracks`: both top lists behind one route.
pub async fn top_by_type(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TopByTypeParams>,
) -> Response {
    let path = match or_default(params.kind.as_deref(), "artists") {
        "artists" => resources::TOP_ARTISTS,
        "tracks" => resources::TOP_TRACKS,
        _ => return ProxyError::InvalidType.into_response(),
    };

    let limit = or_default(params.limit.as_deref(), DEFAULT_TOP_LIMIT);
    let term = or_default(params.term.as_deref(), DEFAULT_TERM);
    proxy_call(&state, jar, path, &[("limit", limit), ("time_range", term)]).await
}

pub async fn saved_albums(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LimitParams>,
) -> Response {
    let limit = or_default(params.limit.as_deref(), DEFAULT_LIMIT);
    proxy_call(&state, jar, resources::SAVED_ALBUMS, &[("limit", limit)]).await
}

pub async fn multiple_artists(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<IdsParams>,
) -> Response {
    batch(&state, jar, resources::ARTISTS, &params).await
}

pub async fn multiple_tracks(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<IdsParams>,
) -> Response {
    batch(&state, jar, resources::TRACKS, &params).await
}

pub async fn multiple_albums(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<IdsParams>,
) -> Response {
    batch(&state, jar, resources::ALBUMS, &params).await
}

async fn top(state: &AppState, jar: CookieJar, path: &str, params: &TopParams) -> Response {
    let limit = or_default(params.limit.as_deref(), DEFAULT_LIMIT);
    let term = or_default(params.term.as_deref(), DEFAULT_TERM);
    proxy_call(state, jar, path, &[("limit", limit), ("time_range", term)]).await
}

// `ids` is validated before the session is even looked at.
async fn batch(state: &AppState, jar: CookieJar, path: &str, params: &IdsParams) -> Response {
    let Some(ids) = utils::non_empty_ids(params.ids.as_deref()) else {
        return ProxyError::MissingIds.into_response();
    };

    proxy_call(state, jar, path, &[("ids", ids)]).await
}

/// Forwards one authenticated GET to Spotify.
///
/// Refreshes the session first when it is about to expire. Without a usable
/// session the request stops here with 401 and Spotify is never contacted.
/// Spotify's status, `Content-Type` and body are relayed unchanged,
/// including a 401 for a token that looked fresh by the local clock.
pub async fn proxy_call(
    state: &AppState,
    jar: CookieJar,
    path: &str,
    query: &[(&str, &str)],
) -> Response {
    let (jar, session) = state.token_manager().ensure_fresh(jar).await;
    let Some(session) = session else {
        return (jar, ProxyError::Unauthorized).into_response();
    };

    match resources::get(
        &state.client,
        &state.config.api_url,
        path,
        &session.access_token,
        query,
    )
    .await
    {
        Ok(upstream) => (jar, relay(upstream)).into_response(),
        Err(e) => {
            warning!("Upstream call to {} failed: {}", path, e);
            (jar, ProxyError::Upstream(e)).into_response()
        }
    }
}

fn relay(upstream: UpstreamResponse) -> Response {
    let mut res = (upstream.status, upstream.body).into_response();
    // Bytes bodies default to octet-stream; mirror Spotify instead.
    res.headers_mut().remove(header::CONTENT_TYPE);
    if let Some(content_type) = upstream.content_type {
        res.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    res
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
}
