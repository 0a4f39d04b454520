use axum::body::Bytes;
use reqwest::{Client, StatusCode, header::{CONTENT_TYPE, HeaderValue}};

use crate::utils;

pub const ME: &str = "/v1/me";
pub const TOP_ARTISTS: &str = "/v1/me/top/artists";
pub const TOP_TRACKS: &str = "/v1/me/top/tracks";
pub const SAVED_ALBUMS: &str = "/v1/me/albums";
pub const ARTISTS: &str = "/v1/artists";
pub const TRACKS: &str = "/v1/tracks";
pub const ALBUMS: &str = "/v1/albums";

/// Raw answer of the resource API, relayed to the browser unchanged.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Absent for bodiless answers such as 204.
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Issues an authenticated GET against the Spotify resource API.
///
/// The query is forwarded as given. Any HTTP status, including 401 and 429,
/// is returned as a successful [`UpstreamResponse`]; only transport failures
/// and timeouts are errors.
///
/// # Example
///
/// ```
/// let res = get(&client, "https://api.spotify.com", TOP_ARTISTS, token,
///     &[("limit", "10"), ("time_range", "medium_term")]).await?;
/// ```
pub async fn get(
    client: &Client,
    api_url: &str,
    path: &str,
    access_token: &str,
    query: &[(&str, &str)],
) -> Result<UpstreamResponse, reqwest::Error> {
    let mut request = client
        .get(utils::upstream_url(api_url, path))
        .bearer_auth(access_token);

    if !query.is_empty() {
        request = request.query(query);
    }

    let res = request.send().await?;
    let status = res.status();
    let content_type = res.headers().get(CONTENT_TYPE).cloned();
    let body = res.bytes().await?;

    Ok(UpstreamResponse {
        status,
        content_type,
        body,
    })
}
