use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::Duration;

use crate::types::Session;

pub const SESSION_COOKIE_NAME: &str = "roomify_session";
pub const SESSION_TTL_DAYS: i64 = 7;

type HmacSha256 = Hmac<Sha256>;

/// Where a [`Session`] lives between requests.
///
/// The refresh policy in [`TokenManager`](super::TokenManager) only talks to
/// this trait, so a server-side store keyed by a session id could replace the
/// signed cookie without touching the handshake.
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the session carried by the request, or `None` when there is
    /// none or it cannot be trusted. Never fails.
    fn read(&self, jar: &CookieJar) -> Option<Session>;

    /// Stores `session`, replacing any previous one.
    fn write(&self, jar: CookieJar, session: &Session) -> CookieJar;

    fn clear(&self, jar: CookieJar) -> CookieJar;
}

/// Keeps the whole token triple in an HMAC-SHA256 signed cookie.
///
/// Cookie value: `base64url(json) "." base64url(hmac(json_b64))`.
#[derive(Clone)]
pub struct CookieSessionStore {
    key: HmacSha256,
    secure: bool,
}

impl CookieSessionStore {
    pub fn new(secret: impl AsRef<[u8]>, secure: bool) -> Self {
        // HMAC pads or hashes the key, so every length is accepted.
        let key = <HmacSha256 as KeyInit>::new_from_slice(secret.as_ref())
            .unwrap_or_else(|_| unreachable!("HMAC takes keys of any length"));

        Self { key, secure }
    }

    pub fn encode(&self, session: &Session) -> String {
        // Serializing three plain fields cannot fail.
        let json = serde_json::to_vec(session).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes()).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    pub fn decode(&self, value: &str) -> Option<Session> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        self.mac(payload.as_bytes()).verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = self.key.clone();
        mac.update(data);
        mac
    }
}

impl SessionStore for CookieSessionStore {
    fn read(&self, jar: &CookieJar) -> Option<Session> {
        jar.get(SESSION_COOKIE_NAME)
            .and_then(|cookie| self.decode(cookie.value()))
    }

    fn write(&self, jar: CookieJar, session: &Session) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE_NAME, self.encode(session)))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::days(SESSION_TTL_DAYS))
            .build();

        jar.add(cookie)
    }

    fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"))
    }
}
