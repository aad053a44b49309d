//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                   - Liveness check
//!
//! # Auth
//! POST   /auth/login                               - Email/password sign-in
//! POST   /auth/logout                              - Sign out
//! GET    /auth/me                                  - Current user
//!
//! # Tenants (scoped by ownership)
//! GET    /api/tenants                              - List visible tenants
//! POST   /api/tenants                              - Create (admins only)
//! GET    /api/tenants/{id}                         - Tenant detail
//! PATCH  /api/tenants/{id}                         - Merge-patch config
//! DELETE /api/tenants/{id}                         - Delete (admins only)
//!
//! # Products
//! GET    /api/tenants/{id}/products                - List
//! POST   /api/tenants/{id}/products                - Create
//! PATCH  /api/tenants/{id}/products/{product_id}   - Merge-patch
//! DELETE /api/tenants/{id}/products/{product_id}   - Delete
//!
//! # System (admins only)
//! GET    /api/owners                               - Owner -> tenant hierarchy
//! GET    /api/stats                                - System statistics
//! ```

pub mod auth;
pub mod owners;
pub mod products;
pub mod stats;
pub mod tenants;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let login = if rate_limited {
        post(auth::login).layer(login_rate_limiter())
    } else {
        post(auth::login)
    };
    Router::new()
        .route("/login", login)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the tenant and product routes router.
pub fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tenants::index).post(tenants::create))
        .route(
            "/{id}",
            get(tenants::show)
                .patch(tenants::update)
                .delete(tenants::delete),
        )
        .route(
            "/{id}/products",
            get(products::index).post(products::create),
        )
        .route(
            "/{id}/products/{product_id}",
            patch(products::update).delete(products::delete),
        )
}

/// Create all routes for the admin.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(rate_limited))
        .nest("/api/tenants", tenant_routes())
        .route("/api/owners", get(owners::index))
        .route("/api/stats", get(stats::show))
}

/// Liveness health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}
