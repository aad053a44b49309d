//! Product route handlers, nested under a tenant.
//!
//! Every handler first checks that the caller may manage the tenant, then
//! loads it: the tenant's taxonomy fills in missing category and brand
//! tags on create and update.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use vitrina_core::catalog::Product;
use vitrina_core::tenant::{NewProductRow, TenantProduct, apply_product_patch};
use vitrina_core::{ProductId, TenantId};

use super::tenants::load_tenant;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(tenant_id): Path<TenantId>,
) -> Result<Json<Vec<TenantProduct>>> {
    auth.require_tenant(tenant_id)?;
    let products = ProductRepository::new(state.backend(), auth.token())
        .list(tenant_id)
        .await?;
    Ok(Json(products))
}

/// Create a product. A code already used in this tenant is a 409.
#[instrument(skip(state, auth, product), fields(user_id = %auth.user.id, code = %product.code))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(tenant_id): Path<TenantId>,
    Json(product): Json<Product>,
) -> Result<(StatusCode, Json<TenantProduct>)> {
    auth.require_writable()?;
    let tenant = load_tenant(&state, &auth, tenant_id).await?;
    let row = NewProductRow::prepare(tenant_id, product, &tenant.taxonomy)?;

    let created = ProductRepository::new(state.backend(), auth.token())
        .create(&row)
        .await?;

    tracing::info!(%tenant_id, product_id = %created.product.id, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Merge-patch a product. Clearing `category` or `brand` re-infers it.
#[instrument(skip(state, auth, patch), fields(user_id = %auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path((tenant_id, product_id)): Path<(TenantId, ProductId)>,
    Json(patch): Json<Value>,
) -> Result<Json<TenantProduct>> {
    auth.require_writable()?;
    let tenant = load_tenant(&state, &auth, tenant_id).await?;
    let products = ProductRepository::new(state.backend(), auth.token());

    let current = products
        .get(tenant_id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    let updated = apply_product_patch(&current.product, &patch, &tenant.taxonomy)?;
    let saved = products.update(tenant_id, &updated).await?;

    tracing::info!(%tenant_id, %product_id, "Product updated");
    Ok(Json(saved))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path((tenant_id, product_id)): Path<(TenantId, ProductId)>,
) -> Result<StatusCode> {
    auth.require_writable()?;
    auth.require_tenant(tenant_id)?;
    ProductRepository::new(state.backend(), auth.token())
        .delete(tenant_id, product_id)
        .await?;

    tracing::info!(%tenant_id, %product_id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
