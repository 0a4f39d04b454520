mod auth;
mod session;

pub use auth::TokenManager;
pub use session::CookieSessionStore;
pub use session::SESSION_COOKIE_NAME;
pub use session::SESSION_TTL_DAYS;
pub use session::SessionStore;
