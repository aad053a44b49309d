//! Product catalog.
//!
//! A [`Catalog`] is an immutable, ingested list of [`Product`]s. Ingestion
//! is the one place where taxonomy tags get filled in and product codes are
//! checked for uniqueness; everything downstream (search, cart, checkout)
//! can rely on both.

pub mod condition;
pub mod taxonomy;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductCode, ProductId};

pub use condition::ProductCondition;
pub use taxonomy::{FALLBACK_TAG, Taxonomy, TaxonomyEntry};

/// A product as listed in a tenant's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default = "ProductId::generate")]
    pub id: ProductId,
    /// Merchant SKU, unique within the catalog.
    pub code: ProductCode,
    pub name: String,
    /// Free-text condition label ("Nuevo", "Usado - Excelente").
    #[serde(default)]
    pub condition: String,
    /// List price before discount.
    pub original_price: Price,
    /// Current selling price.
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// Urgency blurb ("¡Últimas 2 unidades!").
    #[serde(default)]
    pub urgency: Option<String>,
    /// Call-to-action button text.
    #[serde(default)]
    pub cta: Option<String>,
    /// Discount badge text ("-30%").
    #[serde(default)]
    pub discount_label: Option<String>,
    /// Image URL or path.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: u32,
    /// Category tag. Filled in at ingestion when missing.
    #[serde(default)]
    pub category: Option<String>,
    /// Brand tag. Filled in at ingestion when missing.
    #[serde(default)]
    pub brand: Option<String>,
}

impl Product {
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.price < self.original_price
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Discount as a fraction of the original price, `(original - price) / original`.
    ///
    /// Zero when the original price is zero or the ratio is out of range.
    #[must_use]
    pub fn discount_fraction(&self) -> Decimal {
        let original = self.original_price.amount();
        original
            .checked_sub(self.price.amount())
            .and_then(|saved| saved.checked_div(original))
            .unwrap_or(Decimal::ZERO)
    }

    /// Whole-number discount percentage, for badges.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        use rust_decimal::prelude::ToPrimitive;

        self.discount_fraction()
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|percent| percent.round().to_u32())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn condition_kind(&self) -> ProductCondition {
        ProductCondition::classify(&self.condition)
    }

    #[must_use]
    pub fn category_tag(&self) -> &str {
        self.category.as_deref().unwrap_or(FALLBACK_TAG)
    }

    #[must_use]
    pub fn brand_tag(&self) -> &str {
        self.brand.as_deref().unwrap_or(FALLBACK_TAG)
    }

    /// Check the fields every stored product must have.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for an empty code or name, or a negative price.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.code.as_str().is_empty() {
            return Err(CatalogError::EmptyCode);
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName(self.code.clone()));
        }
        if self.price.amount().is_sign_negative() || self.original_price.amount().is_sign_negative() {
            return Err(CatalogError::NegativePrice(self.code.clone()));
        }
        Ok(())
    }

    /// Fill in missing taxonomy tags from the product's text.
    pub fn apply_taxonomy(&mut self, taxonomy: &Taxonomy) {
        if self.category.is_some() && self.brand.is_some() {
            return;
        }
        let (category, brand) = taxonomy.infer(&self.name, &self.description);
        self.category.get_or_insert(category);
        self.brand.get_or_insert(brand);
    }
}

/// Errors raised while ingesting a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate product code: {0}")]
    DuplicateCode(ProductCode),
    #[error("product {0} has an empty name")]
    EmptyName(ProductCode),
    #[error("product code cannot be empty")]
    EmptyCode,
    #[error("product {0} has a negative price")]
    NegativePrice(ProductCode),
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An ingested, read-only product catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Ingest products, validating codes and filling taxonomy tags.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for a duplicated code or any product that
    /// fails [`Product::validate`].
    pub fn ingest(products: Vec<Product>, taxonomy: &Taxonomy) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::with_capacity(products.len());
        let mut ingested = Vec::with_capacity(products.len());

        for mut product in products {
            product.validate()?;
            if !seen.insert(product.code.clone()) {
                return Err(CatalogError::DuplicateCode(product.code));
            }
            product.apply_taxonomy(taxonomy);
            ingested.push(product);
        }

        Ok(Self { products: ingested })
    }

    /// Parse and ingest a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, or any ingestion error.
    pub fn from_json(json: &str, taxonomy: &Taxonomy) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::ingest(products, taxonomy)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, code: &ProductCode) -> Option<&Product> {
        self.products.iter().find(|p| &p.code == code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Test and fixture helper: a minimal product with sensible defaults.
#[must_use]
pub fn sample_product(code: &str, name: &str, price: i64, original_price: i64) -> Product {
    Product {
        id: ProductId::generate(),
        code: ProductCode::new(code),
        name: name.to_owned(),
        condition: "Nuevo".to_owned(),
        original_price: Price::from_units(original_price),
        price: Price::from_units(price),
        description: String::new(),
        features: Vec::new(),
        urgency: None,
        cta: None,
        discount_label: None,
        image: None,
        stock: 1,
        category: None,
        brand: None,
    }
}
