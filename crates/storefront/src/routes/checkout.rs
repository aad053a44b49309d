//! Checkout route handler.
//!
//! Checkout never stores an order: it turns the cart into a WhatsApp
//! message (plus a MercadoPago link when requested) and empties the cart.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use vitrina_core::checkout::{CheckoutPlan, CustomerDetails, plan_checkout};

use super::cart::{load_cart, save_cart};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Build the WhatsApp order link for the current cart.
#[instrument(skip(state, session, customer), fields(payment_method = %customer.payment_method))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(customer): Json<CustomerDetails>,
) -> Result<Json<CheckoutPlan>> {
    let tenant = state.store().await?;
    if !tenant.features.whatsapp_checkout {
        return Err(AppError::FeatureDisabled("WhatsApp checkout"));
    }

    let mut cart = load_cart(&session).await?;
    let plan = plan_checkout(tenant.merchant(), &cart, &customer)?;

    cart.clear();
    save_cart(&session, &cart).await?;

    add_breadcrumb("checkout", "Checkout link created", None);
    tracing::info!(
        tenant = %tenant.slug,
        items = plan.totals.total_items,
        total = %plan.totals.total_price,
        "Checkout planned"
    );

    Ok(Json(plan))
}
