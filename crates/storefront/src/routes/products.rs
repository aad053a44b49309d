//! Catalog route handlers: listing, detail and facets.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use vitrina_core::catalog::ProductCondition;
use vitrina_core::search::{
    Facets, FilterState, Page, PageRequest, PriceRange, SortKey, search,
};
use vitrina_core::tenant::TenantConfig;
use vitrina_core::{Price, ProductCode};

use crate::error::{AppError, Result};
use crate::models::ProductView;
use crate::state::AppState;

/// Query parameters for `GET /api/products`.
///
/// List parameters (`category`, `brand`, `condition`) are comma-separated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub discount: bool,
    pub in_stock: bool,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn split_tags(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

impl ProductQuery {
    /// Build the filter, dropping whatever the store has switched off.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for an unknown condition tag.
    pub fn filter(&self, tenant: &TenantConfig) -> Result<FilterState> {
        let mut filter = FilterState::default();

        if tenant.features.search {
            filter.query = self.q.clone().filter(|q| !q.trim().is_empty());
        }

        if tenant.features.filters {
            filter.categories = split_tags(self.category.as_deref());
            filter.brands = split_tags(self.brand.as_deref());
            filter.conditions = split_tags(self.condition.as_deref())
                .iter()
                .map(|tag| {
                    ProductCondition::from_tag(tag)
                        .ok_or_else(|| AppError::BadRequest(format!("unknown condition: {tag}")))
                })
                .collect::<Result<_>>()?;
            filter.price = PriceRange {
                min: self.min_price,
                max: self.max_price,
            };
            filter.discount_only = self.discount;
            filter.in_stock = self.in_stock;
        }

        Ok(filter)
    }

    /// The requested sort, or the store's default.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for an unknown sort key.
    pub fn sort(&self, tenant: &TenantConfig) -> Result<SortKey> {
        self.sort.as_deref().map_or(Ok(tenant.layout.default_sort), |sort| {
            sort.parse()
                .map_err(|e: vitrina_core::ParseEnumError| AppError::BadRequest(e.to_string()))
        })
    }

    /// The requested page; size falls back to the store layout, then to
    /// the instance default.
    #[must_use]
    pub fn page(&self, tenant: &TenantConfig, default_size: usize) -> PageRequest {
        let layout_size = usize::try_from(tenant.layout.products_per_page).unwrap_or(0);
        let size = self
            .page_size
            .filter(|size| *size > 0)
            .or_else(|| (layout_size > 0).then_some(layout_size))
            .unwrap_or(default_size);
        PageRequest::new(self.page.unwrap_or(1), size)
    }
}

/// Search, filter, sort and paginate the store's catalog.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Page<ProductView>>> {
    let tenant = state.store().await?;
    let catalog = state.catalog(&tenant).await?;

    let filter = query.filter(&tenant)?;
    let sort = query.sort(&tenant)?;
    let page = query.page(&tenant, state.config().page_size);

    let results = search(catalog.products(), &filter, sort, page);
    tracing::debug!(total = results.total, page = results.page, "Catalog search");

    Ok(Json(
        results.map(|product| ProductView::new(product, &tenant.features)),
    ))
}

/// A single product by code.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ProductView>> {
    let tenant = state.store().await?;
    let catalog = state.catalog(&tenant).await?;

    let product = catalog
        .get(&ProductCode::new(&code))
        .ok_or_else(|| AppError::NotFound(format!("product {code}")))?;

    Ok(Json(ProductView::new(product, &tenant.features)))
}

/// Query parameters for `GET /api/facets`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FacetQuery {
    pub q: Option<String>,
}

/// Filter sidebar counts for the products matching `q`.
#[instrument(skip(state))]
pub async fn facets(
    State(state): State<AppState>,
    Query(query): Query<FacetQuery>,
) -> Result<Json<Facets>> {
    let tenant = state.store().await?;
    let catalog = state.catalog(&tenant).await?;

    let q = query.q.as_deref().filter(|_| tenant.features.search);
    Ok(Json(Facets::compute(catalog.products(), q)))
}
