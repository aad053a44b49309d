//! Product repository.

use std::collections::HashMap;

use serde::Deserialize;

use vitrina_core::catalog::Product;
use vitrina_core::tenant::{NewProductRow, TenantProduct};
use vitrina_core::{ProductId, TenantId};

use super::single;
use crate::backend::{BackendClient, BackendError, eq};

const TABLE: &str = "products";

/// Repository for the `products` table.
pub struct ProductRepository<'a> {
    client: &'a BackendClient,
    token: Option<&'a str>,
}

#[derive(Deserialize)]
struct TenantIdRow {
    tenant_id: TenantId,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient, token: Option<&'a str>) -> Self {
        Self { client, token }
    }

    /// A tenant's products in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<TenantProduct>, BackendError> {
        self.client
            .select(
                self.token,
                TABLE,
                &[
                    ("tenant_id", eq(tenant_id)),
                    ("order", "created_at.asc,code.asc".to_string()),
                ],
            )
            .await
    }

    /// Every product the bearer can see.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn all(&self) -> Result<Vec<TenantProduct>, BackendError> {
        self.client.select(self.token, TABLE, &[]).await
    }

    /// Product count per tenant.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn counts(&self) -> Result<HashMap<TenantId, usize>, BackendError> {
        let rows: Vec<TenantIdRow> = self
            .client
            .select(self.token, TABLE, &[("select", "tenant_id".to_string())])
            .await?;

        let mut counts = HashMap::new();
        for row in rows {
            *counts.entry(row.tenant_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        id: ProductId,
    ) -> Result<Option<TenantProduct>, BackendError> {
        let rows: Vec<TenantProduct> = self
            .client
            .select(
                self.token,
                TABLE,
                &[("tenant_id", eq(tenant_id)), ("id", eq(id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a product. A code already used in the tenant comes back as
    /// [`BackendError::Conflict`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the insert fails.
    pub async fn create(&self, row: &NewProductRow) -> Result<TenantProduct, BackendError> {
        let rows = self.client.insert(self.token, TABLE, row).await?;
        single(rows, "inserted product")
    }

    /// Insert or replace products by `(tenant_id, code)`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    pub async fn upsert_many(
        &self,
        rows: &[NewProductRow],
    ) -> Result<Vec<TenantProduct>, BackendError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .upsert(self.token, TABLE, "tenant_id,code", rows)
            .await
    }

    /// Replace the stored columns of one product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no row matched.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        product: &Product,
    ) -> Result<TenantProduct, BackendError> {
        let rows = self
            .client
            .update(
                self.token,
                TABLE,
                &[("tenant_id", eq(tenant_id)), ("id", eq(product.id))],
                product,
            )
            .await?;
        single(rows, &format!("product {}", product.id))
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no row was deleted.
    pub async fn delete(&self, tenant_id: TenantId, id: ProductId) -> Result<(), BackendError> {
        let deleted = self
            .client
            .delete(
                self.token,
                TABLE,
                &[("tenant_id", eq(tenant_id)), ("id", eq(id))],
            )
            .await?;
        if deleted == 0 {
            return Err(BackendError::NotFound(format!("product {id}")));
        }
        Ok(())
    }
}
