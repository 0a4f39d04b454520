use serde::{Deserialize, Serialize};

/// Token triple held by the browser inside the signed session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl Session {
    /// True once `now` has entered the safety margin before `expires_at`.
    pub fn needs_refresh(&self, now: i64, margin: i64) -> bool {
        now >= self.expires_at - margin
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuth {
    /// `client_id` and `client_secret` sent as form fields.
    Body,
    /// `Authorization: Basic base64(client_id:client_secret)`.
    Basic,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub limit: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopByTypeParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdsParams {
    pub ids: Option<String>,
}
