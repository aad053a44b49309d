//! Owner hierarchy.

use axum::{Json, extract::State};
use tracing::instrument;

use vitrina_core::tenant::{OwnerNode, group_by_owner};

use crate::db::{OwnerRepository, ProductRepository, TenantRepository};
use crate::error::Result;
use crate::middleware::RequireSystemAccess;
use crate::state::AppState;

/// Every owner with their tenants and product counts. Tenants whose owner
/// row is missing appear under a placeholder owner.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireSystemAccess(auth): RequireSystemAccess,
) -> Result<Json<Vec<OwnerNode>>> {
    let backend = state.backend();
    let token = auth.token();

    let owners = OwnerRepository::new(backend, token);
    let tenants = TenantRepository::new(backend, token);
    let products = ProductRepository::new(backend, token);

    let (owners, tenants, counts) =
        tokio::try_join!(owners.list(), tenants.list(None), products.counts())?;

    Ok(Json(group_by_owner(&owners, &tenants, &counts)))
}
