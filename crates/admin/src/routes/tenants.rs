//! Tenant route handlers.
//!
//! Listing is scoped to what the caller may manage. Creating and deleting
//! tenants are admin-only; tenant owners may edit their own tenants'
//! configuration but not their status, plan or owner.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use vitrina_core::TenantId;
use vitrina_core::tenant::{NewTenant, TenantConfig, TenantUpdate, apply_patch};

use crate::db::TenantRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, RequireSystemAccess};
use crate::state::AppState;

/// Tenants the caller may manage, newest first.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Vec<TenantConfig>>> {
    let scope = (!auth.user.is_global()).then_some(auth.user.tenant_ids.as_slice());
    let tenants = TenantRepository::new(state.backend(), auth.token())
        .list(scope)
        .await?;
    Ok(Json(tenants))
}

/// Create a tenant with default nested configuration where omitted.
#[instrument(skip(state, auth, request), fields(user_id = %auth.user.id, slug = %request.slug))]
pub async fn create(
    State(state): State<AppState>,
    RequireSystemAccess(auth): RequireSystemAccess,
    Json(request): Json<NewTenant>,
) -> Result<(StatusCode, Json<TenantConfig>)> {
    let insert = request.validate()?;
    let tenant = TenantRepository::new(state.backend(), auth.token())
        .create(&insert)
        .await?;

    tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug.as_str(), "Tenant created");
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// Load a tenant the caller may manage.
pub(crate) async fn load_tenant(
    state: &AppState,
    auth: &crate::middleware::Authenticated,
    id: TenantId,
) -> Result<TenantConfig> {
    auth.require_tenant(id)?;
    TenantRepository::new(state.backend(), auth.token())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tenant {id}")))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<TenantId>,
) -> Result<Json<TenantConfig>> {
    Ok(Json(load_tenant(&state, &auth, id).await?))
}

/// Merge-patch a tenant. Nested objects merge key by key, `null` resets a
/// key to its default, and the slug can't change.
#[instrument(skip(state, auth, patch), fields(user_id = %auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<TenantId>,
    Json(patch): Json<Value>,
) -> Result<Json<TenantConfig>> {
    auth.require_writable()?;
    let current = load_tenant(&state, &auth, id).await?;
    let updated = apply_patch(&current, &patch)?;

    let admin_fields_changed = updated.status != current.status
        || updated.plan != current.plan
        || updated.owner_id != current.owner_id;
    if admin_fields_changed && !auth.user.is_global() {
        return Err(AppError::Forbidden(
            "only admins can change status, plan or owner".to_string(),
        ));
    }

    let tenant = TenantRepository::new(state.backend(), auth.token())
        .update(id, &TenantUpdate::from(updated))
        .await?;

    tracing::info!(tenant_id = %id, "Tenant updated");
    Ok(Json(tenant))
}

/// Delete a tenant; its products go with it.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireSystemAccess(auth): RequireSystemAccess,
    Path(id): Path<TenantId>,
) -> Result<StatusCode> {
    TenantRepository::new(state.backend(), auth.token())
        .delete(id)
        .await?;

    tracing::info!(tenant_id = %id, "Tenant deleted");
    Ok(StatusCode::NO_CONTENT)
}
