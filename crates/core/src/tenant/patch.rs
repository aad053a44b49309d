//! Partial tenant updates.
//!
//! Patches follow JSON merge-patch rules: objects merge recursively, any
//! other value replaces the target, and `null` removes the key (which then
//! falls back to its default on deserialization).

use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    Branding, BusinessInfo, FeatureFlags, LayoutPreferences, PaymentSettings, TenantConfig,
    validate_name,
};
use crate::catalog::Taxonomy;
use crate::types::{Plan, TenantStatus, UserId};

/// Columns a patch may change.
pub const MUTABLE_FIELDS: [&str; 10] = [
    "name", "status", "plan", "owner_id", "branding", "business", "features", "payment",
    "taxonomy", "layout",
];

/// Columns owned by the database; echoed values are ignored.
const READ_ONLY_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantPatchError {
    #[error("patch must be a JSON object")]
    NotAnObject,
    #[error("slug cannot be changed after creation")]
    SlugImmutable,
    #[error("unknown tenant field: {0}")]
    UnknownField(String),
    #[error("invalid tenant patch: {0}")]
    Invalid(String),
}

/// Apply an RFC 7386 merge patch to `target` in place.
pub fn merge_json(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_json(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Merge `patch` into `current` and return the updated tenant.
///
/// # Errors
///
/// Returns [`TenantPatchError`] when the patch isn't an object, changes the
/// slug, names an unknown field, or produces an invalid tenant.
pub fn apply_patch(current: &TenantConfig, patch: &Value) -> Result<TenantConfig, TenantPatchError> {
    let Value::Object(fields) = patch else {
        return Err(TenantPatchError::NotAnObject);
    };

    let mut accepted = Map::new();
    for (key, value) in fields {
        match key.as_str() {
            "slug" => {
                if value.as_str() != Some(current.slug.as_str()) {
                    return Err(TenantPatchError::SlugImmutable);
                }
            }
            k if READ_ONLY_FIELDS.contains(&k) => {}
            k if MUTABLE_FIELDS.contains(&k) => {
                accepted.insert(key.clone(), value.clone());
            }
            _ => return Err(TenantPatchError::UnknownField(key.clone())),
        }
    }

    let mut merged =
        serde_json::to_value(current).map_err(|e| TenantPatchError::Invalid(e.to_string()))?;
    merge_json(&mut merged, &Value::Object(accepted));

    let updated: TenantConfig =
        serde_json::from_value(merged).map_err(|e| TenantPatchError::Invalid(e.to_string()))?;
    validate_name(&updated.name).map_err(|e| TenantPatchError::Invalid(e.to_string()))?;
    Ok(updated)
}

/// The mutable columns of a tenant, sent as an update body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantUpdate {
    pub name: String,
    pub status: TenantStatus,
    pub plan: Plan,
    pub owner_id: UserId,
    pub branding: Branding,
    pub business: BusinessInfo,
    pub features: FeatureFlags,
    pub payment: PaymentSettings,
    pub taxonomy: Taxonomy,
    pub layout: LayoutPreferences,
}

impl From<TenantConfig> for TenantUpdate {
    fn from(tenant: TenantConfig) -> Self {
        Self {
            name: tenant.name,
            status: tenant.status,
            plan: tenant.plan,
            owner_id: tenant.owner_id,
            branding: tenant.branding,
            business: tenant.business,
            features: tenant.features,
            payment: tenant.payment,
            taxonomy: tenant.taxonomy,
            layout: tenant.layout,
        }
    }
}
