use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};

const STATE_LENGTH: usize = 32;

/// Random alphanumeric token for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Joins the resource API origin and an upstream path such as `/v1/me`.
pub fn upstream_url(api_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Returns the trimmed `ids` list, or `None` when it is missing or blank.
pub fn non_empty_ids(ids: Option<&str>) -> Option<&str> {
    ids.map(str::trim)
        .filter(|ids| !ids.split(',').all(|id| id.trim().is_empty()))
}

/// Whether an `Origin` header value appears in the allow-list.
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    let origin = origin.trim_end_matches('/');
    allowed.iter().any(|a| a == origin)
}
