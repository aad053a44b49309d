//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions) - added in `main`
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (fresh UUID per request)
//! 4. Security headers (HSTS over HTTPS)
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Login rate limiting, on `POST /auth/login` only
//!
//! Authentication is enforced per handler by the extractors in [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, Authenticated, RequireAuth, RequireSystemAccess, clear_current_user,
    set_current_user,
};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
