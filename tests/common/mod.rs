#![allow(dead_code)]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use roomify::{
    config::Config,
    management::{CookieSessionStore, SESSION_COOKIE_NAME},
    server::{AppState, router},
    types::{ClientAuth, Session},
};
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &[u8] = b"test-session-secret";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const FRONTEND_URL: &str = "http://localhost:5173/room";
pub const FRONTEND_ORIGIN: &str = "http://localhost:5173";

// Config whose Spotify endpoints all point at the fake provider
pub fn test_config(provider: &str) -> Config {
    Config {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: REDIRECT_URI.to_string(),
        scope: "user-read-email user-top-read".to_string(),
        auth_url: format!("{}/authorize", provider),
        token_url: format!("{}/api/token", provider),
        api_url: provider.to_string(),
        token_auth: ClientAuth::Basic,
        server_addr: "127.0.0.1:0".to_string(),
        frontend_url: FRONTEND_URL.to_string(),
        allowed_origins: vec![FRONTEND_ORIGIN.to_string()],
        session_secret: SECRET.to_vec(),
        secure_cookies: false,
        refresh_margin: 10,
        http_timeout: Duration::from_secs(5),
    }
}

pub fn store() -> CookieSessionStore {
    CookieSessionStore::new(SECRET, false)
}

pub fn app(config: Config) -> Router {
    router(AppState::new(config).expect("http client"))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("infallible router")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn session(access: &str, refresh: &str, expires_at: i64) -> Session {
    Session {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at,
    }
}

// `Cookie` header value carrying a signed session
pub fn session_cookie(session: &Session) -> String {
    format!("{}={}", SESSION_COOKIE_NAME, store().encode(session))
}

pub fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

// Value of the named cookie as set by the response, if any
pub fn set_cookie_value(res: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(res).into_iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    })
}

pub fn cookie_removed(res: &Response<Body>, name: &str) -> bool {
    let prefix = format!("{}=", name);
    set_cookies(res)
        .iter()
        .any(|c| c.starts_with(&prefix) && c.contains("Max-Age=0"))
}

pub async fn body_bytes(res: Response<Body>) -> Vec<u8> {
    to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(res: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(res).await).expect("json body")
}

pub async fn body_text(res: Response<Body>) -> String {
    String::from_utf8(body_bytes(res).await).expect("utf-8 body")
}
