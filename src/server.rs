use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    Res, api,
    config::Config,
    error::ProxyError,
    management::{CookieSessionStore, SessionStore, TokenManager},
    success, utils, warning,
};

/// Immutable state shared by every request handler.
///
/// Holds no per-user data: each request rebuilds its session from its own
/// cookie.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Client,
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Wires the signed-cookie session store and an HTTP client whose timeout
    /// applies to every Spotify call.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let store = CookieSessionStore::new(&config.session_secret, config.secure_cookies);
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: Config, store: Arc<dyn SessionStore>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
            store,
        })
    }

    pub fn token_manager(&self) -> TokenManager<'_> {
        TokenManager::new(&self.client, &self.config, self.store.as_ref())
    }
}

pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", post(api::logout))
        .route("/api/me", get(api::me))
        .route("/api/me/top", get(api::top_by_type))
        .route("/api/top-artists", get(api::top_artists))
        .route("/api/top-tracks", get(api::top_tracks))
        .route("/api/saved-albums", get(api::saved_albums))
        .route("/api/multiple-artists", get(api::multiple_artists))
        .route("/api/multiple-tracks", get(api::multiple_tracks))
        .route("/api/multiple-albums", get(api::multiple_albums))
        .layer(middleware::from_fn_with_state(state.clone(), enforce_origin))
        .layer(cors)
        .with_state(state)
}

/// Rejects browser requests from origins outside the allow-list.
///
/// Requests without an `Origin` header (curl, server-to-server, top-level
/// navigations) pass through.
async fn enforce_origin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| utils::origin_allowed(o, &state.config.allowed_origins))
            .unwrap_or(false);

        if !allowed {
            warning!("Rejected request from origin {:?}", origin);
            return ProxyError::OriginNotAllowed.into_response();
        }
    }

    next.run(request).await
}

/// Binds the configured address and serves until the process stops.
///
/// `on_ready` runs once the listener is bound, with the actual local address
/// (port `0` resolves to the one the OS picked).
pub async fn start_api_server<F>(config: Config, on_ready: F) -> Res<()>
where
    F: FnOnce(SocketAddr),
{
    let addr = SocketAddr::from_str(&config.server_addr)?;
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    success!("Roomify proxy listening on http://{}", local);
    on_ready(local);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
