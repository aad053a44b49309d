//! Products as stored per tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::patch::merge_json;
use crate::catalog::{CatalogError, Product, Taxonomy};
use crate::types::TenantId;

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProduct {
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub product: Product,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A validated product insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProductRow {
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub product: Product,
}

impl NewProductRow {
    /// Validate `product` and fill its taxonomy tags from the tenant's
    /// taxonomy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the product fails validation.
    pub fn prepare(
        tenant_id: TenantId,
        mut product: Product,
        taxonomy: &Taxonomy,
    ) -> Result<Self, CatalogError> {
        product.validate()?;
        product.apply_taxonomy(taxonomy);
        Ok(Self { tenant_id, product })
    }
}

/// Fields a product patch may touch.
pub const PRODUCT_FIELDS: [&str; 14] = [
    "code",
    "name",
    "condition",
    "original_price",
    "price",
    "description",
    "features",
    "urgency",
    "cta",
    "discount_label",
    "image",
    "stock",
    "category",
    "brand",
];

const PRODUCT_READ_ONLY: [&str; 4] = ["id", "tenant_id", "created_at", "updated_at"];

#[derive(Debug, thiserror::Error)]
pub enum ProductPatchError {
    #[error("patch must be a JSON object")]
    NotAnObject,
    #[error("unknown product field: {0}")]
    UnknownField(String),
    #[error("invalid product patch: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Merge `patch` into `current`, re-inferring any taxonomy tag the patch
/// cleared.
///
/// # Errors
///
/// Returns [`ProductPatchError`] for a non-object patch, an unknown field,
/// or a result that fails validation.
pub fn apply_product_patch(
    current: &Product,
    patch: &Value,
    taxonomy: &Taxonomy,
) -> Result<Product, ProductPatchError> {
    let Value::Object(fields) = patch else {
        return Err(ProductPatchError::NotAnObject);
    };

    let mut accepted = Map::new();
    for (key, value) in fields {
        if PRODUCT_FIELDS.contains(&key.as_str()) {
            accepted.insert(key.clone(), value.clone());
        } else if !PRODUCT_READ_ONLY.contains(&key.as_str()) {
            return Err(ProductPatchError::UnknownField(key.clone()));
        }
    }

    let mut merged = serde_json::to_value(current)?;
    merge_json(&mut merged, &Value::Object(accepted));
    let mut updated: Product = serde_json::from_value(merged)?;
    updated.id = current.id;
    updated.validate()?;
    updated.apply_taxonomy(taxonomy);
    Ok(updated)
}
