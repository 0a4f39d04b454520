use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const STATE_COOKIE_NAME: &str = "oauth_state";
const STATE_TTL_MINUTES: i64 = 10;

/// Short-lived cookie binding the OAuth `state` to this browser.
pub(super) fn state_cookie(state: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::minutes(STATE_TTL_MINUTES))
        .build()
}

pub(super) fn get_state(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub(super) fn clear_state(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(STATE_COOKIE_NAME).path("/"))
}
