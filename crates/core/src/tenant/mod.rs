//! Tenant (store) configuration.
//!
//! A tenant row carries a handful of scalar columns plus six nested JSON
//! objects (`branding`, `business`, `features`, `payment`, `taxonomy`,
//! `layout`). Every nested field has a default so rows written by older
//! versions, or created with a bare `{slug, name}`, still deserialize.

pub mod owner;
pub mod patch;
pub mod product;
pub mod slug;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Taxonomy;
use crate::checkout::Merchant;
use crate::search::SortKey;
use crate::types::{CurrencyCode, Plan, TenantId, TenantStatus, UserId};

pub use owner::{Owner, OwnerNode, TenantSummary, group_by_owner};
pub use patch::{TenantPatchError, TenantUpdate, apply_patch, merge_json};
pub use product::{NewProductRow, ProductPatchError, TenantProduct, apply_product_patch};
pub use slug::{Slug, SlugError};
pub use stats::{PlanCounts, StatusCounts, SystemStats};

/// Visual identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo_url: None,
            favicon_url: None,
            hero_image_url: None,
            primary_color: "#1e40af".to_owned(),
            secondary_color: "#f59e0b".to_owned(),
            accent_color: "#10b981".to_owned(),
            font_family: "Inter".to_owned(),
        }
    }
}

/// Contact and storefront copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessInfo {
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Number orders are sent to.
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub hours: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
}

/// Storefront features a tenant can switch on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    pub cart: bool,
    pub search: bool,
    pub filters: bool,
    pub whatsapp_checkout: bool,
    pub show_stock: bool,
    pub show_discount_badges: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            cart: true,
            search: true,
            filters: true,
            whatsapp_checkout: true,
            show_stock: true,
            show_discount_badges: true,
        }
    }
}

/// Accepted payment options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    pub currency: CurrencyCode,
    pub mercadopago_enabled: bool,
    /// MercadoPago payment link (`https://mpago.la/...`).
    pub mercadopago_link: Option<String>,
    pub transfer_enabled: bool,
    pub bank_alias: Option<String>,
    pub bank_cbu: Option<String>,
}

impl PaymentSettings {
    /// The MercadoPago link, if enabled and present.
    #[must_use]
    pub fn mercadopago_url(&self) -> Option<&str> {
        self.mercadopago_link
            .as_deref()
            .filter(|link| self.mercadopago_enabled && !link.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPreferences {
    pub products_per_page: u32,
    pub grid_columns: u8,
    pub default_sort: SortKey,
}

impl Default for LayoutPreferences {
    fn default() -> Self {
        Self {
            products_per_page: 12,
            grid_columns: 3,
            default_sort: SortKey::Relevance,
        }
    }
}

/// A tenant as stored in the `tenants` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub id: TenantId,
    pub slug: Slug,
    pub name: String,
    #[serde(default)]
    pub status: TenantStatus,
    #[serde(default)]
    pub plan: Plan,
    pub owner_id: UserId,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub business: BusinessInfo,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub payment: PaymentSettings,
    #[serde(default)]
    pub taxonomy: Taxonomy,
    #[serde(default)]
    pub layout: LayoutPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantConfig {
    /// Checkout details for this store.
    #[must_use]
    pub fn merchant(&self) -> Merchant<'_> {
        Merchant {
            store_name: &self.name,
            whatsapp: self.business.whatsapp.as_deref().unwrap_or_default(),
            payment: &self.payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantValidationError {
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("tenant name is required")]
    MissingName,
    #[error("tenant name must be at most {max} characters")]
    NameTooLong { max: usize },
}

/// Longest accepted tenant name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Check a tenant display name.
///
/// # Errors
///
/// Returns [`TenantValidationError`] for a blank or overlong name.
pub fn validate_name(name: &str) -> Result<(), TenantValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TenantValidationError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(TenantValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// A tenant-creation request.
///
/// Raw `slug` is kept as text so a bad slug surfaces as a validation error
/// rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTenant {
    pub slug: String,
    pub name: String,
    pub owner_id: UserId,
    #[serde(default)]
    pub status: TenantStatus,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub business: BusinessInfo,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub payment: PaymentSettings,
    #[serde(default)]
    pub taxonomy: Taxonomy,
    #[serde(default)]
    pub layout: LayoutPreferences,
}

/// A validated tenant insert, serialized as the row body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantInsert {
    pub slug: Slug,
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

impl NewTenant {
    /// Validate and normalize into an insert.
    ///
    /// # Errors
    ///
    /// Returns [`TenantValidationError`] for a bad slug or name.
    pub fn validate(self) -> Result<TenantInsert, TenantValidationError> {
        let slug = Slug::parse(self.slug.trim())?;
        validate_name(&self.name)?;
        Ok(TenantInsert {
            slug,
            name: self.name.trim().to_owned(),
            status: self.status,
            plan: self.plan,
            owner_id: self.owner_id,
            branding: self.branding,
            business: self.business,
            features: self.features,
            payment: self.payment,
            taxonomy: self.taxonomy,
            layout: self.layout,
        })
    }
}

/// Test and fixture helper: a tenant with default nested configuration.
#[must_use]
pub fn sample_tenant(slug: &str, owner_id: UserId) -> TenantConfig {
    let now = Utc::now();
    TenantConfig {
        id: TenantId::generate(),
        slug: Slug(slug.to_owned()),
        name: slug.replace('-', " "),
        status: TenantStatus::Active,
        plan: Plan::Starter,
        owner_id,
        branding: Branding::default(),
        business: BusinessInfo::default(),
        features: FeatureFlags::default(),
        payment: PaymentSettings::default(),
        taxonomy: Taxonomy::default(),
        layout: LayoutPreferences::default(),
        created_at: now,
        updated_at: now,
    }
}
