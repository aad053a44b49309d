//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store loads from backend)
//! GET  /api/store              - Public store configuration
//!
//! # Catalog
//! GET  /api/products           - Search, filter, sort, paginate
//! GET  /api/products/{code}    - Product detail
//! GET  /api/facets             - Filter sidebar counts
//!
//! # Cart (session)
//! GET  /api/cart               - Cart contents and totals
//! POST /api/cart/add           - Add a product (quantity 1)
//! POST /api/cart/update        - Set a quantity (<= 0 removes)
//! POST /api/cart/remove        - Remove a product
//! POST /api/cart/clear         - Empty the cart
//!
//! # Checkout
//! POST /api/checkout           - WhatsApp order link; empties the cart
//! ```

pub mod cart;
pub mod checkout;
pub mod products;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{code}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new().route("/", post(checkout::create));
    if rate_limited {
        router.layer(checkout_rate_limiter())
    } else {
        router
    }
}

/// Create all routes for the storefront.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(store::health))
        .route("/health/ready", get(store::readiness))
        .route("/api/store", get(store::show))
        .route("/api/facets", get(products::facets))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes(rate_limited))
}
