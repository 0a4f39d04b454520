use axum_extra::extract::cookie::CookieJar;
use reqwest::Client;

use crate::{
    config::Config, info, management::SessionStore, spotify, types::Session, utils, warning,
};

/// Hands out sessions that are guaranteed fresh for at least the configured
/// margin.
///
/// Refreshing happens inline, at most once per request. There is no
/// background timer and no retry: a failed refresh drops the session and the
/// browser has to log in again.
pub struct TokenManager<'a> {
    client: &'a Client,
    config: &'a Config,
    store: &'a dyn SessionStore,
}

impl<'a> TokenManager<'a> {
    pub fn new(client: &'a Client, config: &'a Config, store: &'a dyn SessionStore) -> Self {
        TokenManager {
            client,
            config,
            store,
        }
    }

    pub async fn ensure_fresh(&self, jar: CookieJar) -> (CookieJar, Option<Session>) {
        self.ensure_fresh_at(jar, utils::now()).await
    }

    /// Like [`ensure_fresh`](Self::ensure_fresh) with an explicit clock.
    ///
    /// Returns the jar to send back with the response: rewritten after a
    /// refresh, cleared after a failed one, untouched otherwise.
    pub async fn ensure_fresh_at(&self, jar: CookieJar, now: i64) -> (CookieJar, Option<Session>) {
        let Some(session) = self.store.read(&jar) else {
            return (jar, None);
        };

        if !session.needs_refresh(now, self.config.refresh_margin) {
            return (jar, Some(session));
        }

        match spotify::auth::refresh_token(self.client, self.config, &session, now).await {
            Ok(refreshed) if refreshed.needs_refresh(now, self.config.refresh_margin) => {
                warning!(
                    "Refreshed token expires within the margin ({}), dropping session",
                    refreshed.expires_at
                );
                (self.store.clear(jar), None)
            }
            Ok(refreshed) => {
                info!("Refreshed access token, valid until {}", refreshed.expires_at);
                let jar = self.store.write(jar, &refreshed);
                (jar, Some(refreshed))
            }
            Err(e) => {
                warning!("Token refresh failed, dropping session: {}", e);
                (self.store.clear(jar), None)
            }
        }
    }
}
