mod common;

use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::CookieJar;
use roomify::{
    management::{CookieSessionStore, SESSION_COOKIE_NAME, SessionStore, TokenManager},
    spotify::auth::{AuthError, exchange_code},
    utils,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

// Jar as the extractor would build it from a `Cookie` request header
fn jar_with(cookie: &str) -> CookieJar {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    CookieJar::from_headers(&headers)
}

fn jar_with_session_value(value: &str) -> CookieJar {
    jar_with(&format!("{}={}", SESSION_COOKIE_NAME, value))
}

#[test]
fn test_write_then_read_round_trip() {
    let store = store();
    let original = session("access-1", "refresh-1", 1_700_000_000);

    let jar = store.write(CookieJar::new(), &original);
    let read = store.read(&jar).expect("session present");

    assert_eq!(read, original);
}

#[test]
fn test_written_cookie_attributes() {
    let jar = store().write(CookieJar::new(), &session("a", "r", 1));
    let cookie = jar.get(SESSION_COOKIE_NAME).expect("cookie");

    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(
        cookie.same_site(),
        Some(axum_extra::extract::cookie::SameSite::Lax)
    );
    assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
}

#[test]
fn test_read_without_cookie_is_absent() {
    assert!(store().read(&CookieJar::new()).is_none());
    assert!(store().read(&jar_with("other=value")).is_none());
}

#[test]
fn test_read_malformed_values_is_absent() {
    let store = store();
    let unsigned = base64_json(&json!({
        "access_token": "a",
        "refresh_token": "r",
        "expires_at": 1
    }));

    let values = [
        "".to_string(),
        "garbage".to_string(),
        "not.base64!".to_string(),
        ".".to_string(),
        "....".to_string(),
        // URL-encoded plain JSON, no signature at all
        "%7B%22access_token%22%3A%22a%22%7D".to_string(),
        // valid payload, no signature
        unsigned.clone(),
        format!("{}.", unsigned),
        format!("{}.AAAA", unsigned),
    ];

    for value in &values {
        assert!(
            store.read(&jar_with_session_value(value)).is_none(),
            "accepted {:?}",
            value
        );
    }
}

#[test]
fn test_read_rejects_tampered_payload() {
    let store = store();
    let encoded = store.encode(&session("access-1", "refresh-1", 100));
    let (_, signature) = encoded.split_once('.').unwrap();

    // Forge a later expiry and reuse the old signature
    let forged_payload = base64_json(&json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "expires_at": 4_000_000_000_i64
    }));
    let forged = format!("{}.{}", forged_payload, signature);

    assert!(store.read(&jar_with_session_value(&forged)).is_none());
}

#[test]
fn test_read_rejects_other_secret() {
    let other = CookieSessionStore::new(b"another-secret".to_vec(), false);
    let encoded = other.encode(&session("a", "r", 1));

    assert!(store().read(&jar_with_session_value(&encoded)).is_none());
}

#[test]
fn test_signed_json_with_wrong_shape_is_absent() {
    // Correctly signed, but not a session
    let store = store();
    let payload = base64_json(&json!({ "hello": "world" }));
    let signature = {
        use hmac::{Hmac, Mac};
        let mut mac = Hmac::<sha2::Sha256>::new_from_slice(SECRET).unwrap();
        mac.update(payload.as_bytes());
        b64(&mac.finalize().into_bytes())
    };

    let value = format!("{}.{}", payload, signature);
    assert!(store.read(&jar_with_session_value(&value)).is_none());
}

#[test]
fn test_clear_removes_cookie() {
    let store = store();
    let jar = jar_with(&session_cookie(&session("a", "r", 1)));
    assert!(store.read(&jar).is_some());

    let jar = store.clear(jar);
    assert!(store.read(&jar).is_none());
}

#[tokio::test]
async fn test_ensure_fresh_with_fresh_session_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let client = reqwest::Client::new();
    let store = store();
    let manager = TokenManager::new(&client, &config, &store);

    let now = utils::now();
    let stored = session("access-1", "refresh-1", now + 3600);
    let (_, fresh) = manager
        .ensure_fresh(jar_with(&session_cookie(&stored)))
        .await;

    assert_eq!(fresh, Some(stored));
}

#[tokio::test]
async fn test_ensure_fresh_refreshes_stale_session_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let client = reqwest::Client::new();
    let store = store();
    let manager = TokenManager::new(&client, &config, &store);

    // Inside the 10 second margin
    let now = utils::now();
    let stale = session("access-1", "refresh-1", now + 5);
    let (jar, fresh) = manager.ensure_fresh(jar_with(&session_cookie(&stale))).await;

    let fresh = fresh.expect("refreshed session");
    assert_eq!(fresh.access_token, "access-2");
    assert!(fresh.expires_at > utils::now());

    // Spotify did not rotate, so the old refresh token is kept
    assert_eq!(fresh.refresh_token, "refresh-1");

    // And the refreshed session is what the jar now carries
    assert_eq!(store.read(&jar), Some(fresh));
}

#[tokio::test]
async fn test_ensure_fresh_adopts_rotated_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let client = reqwest::Client::new();
    let store = store();
    let manager = TokenManager::new(&client, &config, &store);

    let expired = session("access-1", "refresh-1", 0);
    let (_, fresh) = manager
        .ensure_fresh(jar_with(&session_cookie(&expired)))
        .await;

    assert_eq!(fresh.expect("refreshed").refresh_token, "refresh-2");
}

#[tokio::test]
async fn test_ensure_fresh_drops_session_when_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Refresh token revoked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let client = reqwest::Client::new();
    let store = store();
    let manager = TokenManager::new(&client, &config, &store);

    let expired = session("access-1", "refresh-1", 0);
    let (jar, fresh) = manager
        .ensure_fresh(jar_with(&session_cookie(&expired)))
        .await;

    assert!(fresh.is_none());
    assert!(store.read(&jar).is_none());
}

#[tokio::test]
async fn test_ensure_fresh_without_session_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let client = reqwest::Client::new();
    let store = store();
    let manager = TokenManager::new(&client, &config, &store);

    let (_, fresh) = manager.ensure_fresh(CookieJar::new()).await;
    assert!(fresh.is_none());
}

fn b64(bytes: &[u8]) -> String {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    URL_SAFE_NO_PAD.encode(bytes)
}

fn base64_json(value: &serde_json::Value) -> String {
    b64(&serde_json::to_vec(value).unwrap())
}

#[tokio::test]
async fn test_ensure_fresh_rejects_unusable_expiry() {
    // Zero, negative, overflowing, and positive but inside the margin
    for expires_in in [json!(0), json!(-30), json!(i64::MAX), json!(5)] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "expires_in": expires_in
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = reqwest::Client::new();
        let store = store();
        let manager = TokenManager::new(&client, &config, &store);

        let expired = session("access-1", "refresh-1", 0);
        let (jar, fresh) = manager
            .ensure_fresh(jar_with(&session_cookie(&expired)))
            .await;

        assert!(fresh.is_none(), "accepted expires_in {}", expires_in);
        assert!(store.read(&jar).is_none());
    }
}

#[tokio::test]
async fn test_exchange_code_rejects_unusable_expiry() {
    for expires_in in [0, i64::MAX] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": expires_in
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = reqwest::Client::new();
        let result = exchange_code(&client, &config, "abc", utils::now()).await;

        assert!(
            matches!(result, Err(AuthError::InvalidResponse(_))),
            "accepted expires_in {}",
            expires_in
        );
    }
}

#[test]
fn test_store_with_empty_secret_still_signs() {
    let store = CookieSessionStore::new(Vec::<u8>::new(), false);
    let original = session("a", "r", 1);

    let jar = store.write(CookieJar::new(), &original);
    assert_eq!(store.read(&jar), Some(original));
}
