//! Store information and health checks.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::Result;
use crate::models::StoreView;
use crate::state::AppState;

/// Public store configuration: branding, contact, features, taxonomy.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<StoreView>> {
    let tenant = state.store().await?;
    Ok(Json(StoreView::from(tenant.as_ref())))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 unless the store can be loaded from the backend.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
