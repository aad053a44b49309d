//! System statistics.

use axum::{Json, extract::State};
use tracing::instrument;

use vitrina_core::tenant::SystemStats;

use crate::db::{OwnerRepository, ProductRepository, TenantRepository};
use crate::error::Result;
use crate::middleware::RequireSystemAccess;
use crate::state::AppState;

/// Counts by status and plan, products, stock and owners, computed from
/// the full listings.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireSystemAccess(auth): RequireSystemAccess,
) -> Result<Json<SystemStats>> {
    let backend = state.backend();
    let token = auth.token();

    let tenants = TenantRepository::new(backend, token);
    let products = ProductRepository::new(backend, token);
    let owners = OwnerRepository::new(backend, token);

    let (tenants, products, owners) =
        tokio::try_join!(tenants.list(None), products.all(), owners.list())?;

    Ok(Json(SystemStats::compute(&tenants, &products, &owners)))
}
