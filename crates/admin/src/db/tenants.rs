//! Tenant repository.

use serde::Deserialize;

use vitrina_core::tenant::{TenantConfig, TenantInsert, TenantUpdate};
use vitrina_core::{TenantId, UserId};

use super::single;
use crate::backend::{BackendClient, BackendError, eq, in_list};

const TABLE: &str = "tenants";

/// Repository for the `tenants` table.
pub struct TenantRepository<'a> {
    client: &'a BackendClient,
    token: Option<&'a str>,
}

#[derive(Deserialize)]
struct IdRow {
    id: TenantId,
}

impl<'a> TenantRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient, token: Option<&'a str>) -> Self {
        Self { client, token }
    }

    /// List tenants, newest first. `only` narrows the listing to the given
    /// ids; an empty slice yields nothing without a round trip.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn list(&self, only: Option<&[TenantId]>) -> Result<Vec<TenantConfig>, BackendError> {
        let mut query = vec![("order", "created_at.desc,id.asc".to_string())];
        if let Some(ids) = only {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query.push(("id", in_list(ids)));
        }
        self.client.select(self.token, TABLE, &query).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn get(&self, id: TenantId) -> Result<Option<TenantConfig>, BackendError> {
        let rows: Vec<TenantConfig> = self
            .client
            .select(self.token, TABLE, &[("id", eq(id)), ("limit", "1".to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantConfig>, BackendError> {
        let rows: Vec<TenantConfig> = self
            .client
            .select(self.token, TABLE, &[("slug", eq(slug)), ("limit", "1".to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Ids of the tenants owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn owned_by(&self, owner_id: UserId) -> Result<Vec<TenantId>, BackendError> {
        let rows: Vec<IdRow> = self
            .client
            .select(
                self.token,
                TABLE,
                &[("select", "id".to_string()), ("owner_id", eq(owner_id))],
            )
            .await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    /// Insert a tenant. A taken slug comes back as
    /// [`BackendError::Conflict`] from the unique constraint.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the insert fails.
    pub async fn create(&self, tenant: &TenantInsert) -> Result<TenantConfig, BackendError> {
        let rows = self.client.insert(self.token, TABLE, tenant).await?;
        single(rows, "inserted tenant")
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no row was updated.
    pub async fn update(
        &self,
        id: TenantId,
        changes: &TenantUpdate,
    ) -> Result<TenantConfig, BackendError> {
        let rows = self
            .client
            .update(self.token, TABLE, &[("id", eq(id))], changes)
            .await?;
        single(rows, &format!("tenant {id}"))
    }

    /// Delete a tenant; the `products` foreign key cascades.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no row was deleted.
    pub async fn delete(&self, id: TenantId) -> Result<(), BackendError> {
        match self.client.delete(self.token, TABLE, &[("id", eq(id))]).await? {
            0 => Err(BackendError::NotFound(format!("tenant {id}"))),
            _ => Ok(()),
        }
    }
}
