//! Cart route handlers.
//!
//! The cart lives in the visitor's session under [`keys::CART`]. Every
//! mutation loads it, applies one [`Cart`] method and writes it back.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use vitrina_core::ProductCode;
use vitrina_core::cart::Cart;
use vitrina_core::tenant::TenantConfig;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{CartView, keys};
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart, empty when there is none yet.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// The current store, as long as it has the cart switched on.
async fn require_cart_feature(state: &AppState) -> Result<Arc<TenantConfig>> {
    let tenant = state.store().await?;
    if tenant.features.cart {
        Ok(tenant)
    } else {
        Err(AppError::FeatureDisabled("Cart"))
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub code: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    /// False when the product was already in the cart.
    pub added: bool,
    pub cart: CartView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart contents and totals.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product with quantity 1. Adding a product already in the cart
/// leaves it unchanged.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>> {
    let tenant = require_cart_feature(&state).await?;
    let catalog = state.catalog(&tenant).await?;

    let code = ProductCode::new(request.code.trim());
    let product = catalog
        .get(&code)
        .ok_or_else(|| AppError::NotFound(format!("product {code}")))?;
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    let mut cart = load_cart(&session).await?;
    let added = cart.add(product.clone());
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("code", code.as_str())]));
    tracing::info!(code = %code, added, "Cart add");

    Ok(Json(AddToCartResponse {
        added,
        cart: CartView::from(&cart),
    }))
}

/// Set a line's quantity; zero or less removes it. Quantities above
/// [`vitrina_core::cart::MAX_QUANTITY`] are rejected without touching the
/// stored cart.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    require_cart_feature(&state).await?;

    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&ProductCode::new(request.code.trim()), request.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a line. Unknown codes are ignored.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    require_cart_feature(&state).await?;

    let mut cart = load_cart(&session).await?;
    cart.remove(&ProductCode::new(request.code.trim()));
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Removed from cart", Some(&[("code", request.code.as_str())]));
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}
