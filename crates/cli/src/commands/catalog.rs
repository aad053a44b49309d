//! Catalog commands: offline search over a product file and bulk import
//! into a tenant.
//!
//! Product files are a JSON or YAML list of products, picked by extension
//! (`.json`, `.yaml`, `.yml`).
//!
//! # Usage
//!
//! ```bash
//! vitrina-cli catalog search productos.json -q taladro -b makita --in-stock
//! vitrina-cli catalog import productos.yaml -t herramientas-sur --dry-run
//! ```

use std::path::Path;

use thiserror::Error;

use vitrina_admin::backend::BackendError;
use vitrina_admin::db::{ProductRepository, TenantRepository};
use vitrina_core::catalog::{Catalog, CatalogError, Product, Taxonomy};
use vitrina_core::search::{FilterState, PageRequest, SortKey, search as run_search};
use vitrina_core::tenant::NewProductRow;
use vitrina_core::TenantId;

use super::service::{ServiceBackend, ServiceError};

#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Unsupported product file extension: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Read a product list from a JSON or YAML file.
///
/// # Errors
///
/// Returns [`CatalogCommandError`] if the file can't be read, has an
/// unknown extension, or doesn't parse.
pub fn load_products(path: &Path) -> Result<Vec<Product>, CatalogCommandError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let text = std::fs::read_to_string(path).map_err(|source| CatalogCommandError::Read {
        path: path.display().to_string(),
        source,
    })?;

    match extension.as_str() {
        "json" => Ok(serde_json::from_str(&text)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(&text)?),
        other => Err(CatalogCommandError::UnsupportedFormat(other.to_owned())),
    }
}

/// Validate a product list for import: codes must be unique and every
/// product valid. Missing category and brand tags come from `taxonomy`.
///
/// # Errors
///
/// Returns [`CatalogCommandError::Catalog`] for the first bad product.
pub fn prepare_rows(
    tenant_id: TenantId,
    products: Vec<Product>,
    taxonomy: &Taxonomy,
) -> Result<Vec<NewProductRow>, CatalogCommandError> {
    let catalog = Catalog::ingest(products, taxonomy)?;
    catalog
        .products()
        .iter()
        .cloned()
        .map(|product| NewProductRow::prepare(tenant_id, product, taxonomy))
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

/// Search a product file and print one page of results.
///
/// # Errors
///
/// Returns [`CatalogCommandError`] if the file can't be loaded or ingested.
pub fn search(
    path: &Path,
    filter: &FilterState,
    sort: SortKey,
    page: usize,
    page_size: usize,
) -> Result<(), CatalogCommandError> {
    let catalog = Catalog::ingest(load_products(path)?, &Taxonomy::default())?;
    let results = run_search(
        catalog.products(),
        filter,
        sort,
        PageRequest::new(page, page_size),
    );

    #[allow(clippy::print_stdout)]
    {
        for product in &results.items {
            println!(
                "{:<12} {:>12} {:>4}  {:<10} {:<10} {}",
                product.code.to_string(),
                product.price.to_string(),
                product.stock,
                product.category_tag(),
                product.brand_tag(),
                product.name
            );
        }
        println!(
            "page {}/{} ({} matches)",
            results.page, results.total_pages, results.total
        );
    }
    Ok(())
}

/// Upsert a product file into a tenant's catalog, keyed by product code.
///
/// `tenant` is a slug or a tenant id.
///
/// # Errors
///
/// Returns [`CatalogCommandError`] if the file is invalid, the tenant is
/// unknown, or the backend rejects the write.
pub async fn import(path: &Path, tenant: &str, dry_run: bool) -> Result<(), CatalogCommandError> {
    let products = load_products(path)?;
    tracing::info!(path = %path.display(), products = products.len(), "Loaded product file");

    let service = ServiceBackend::from_env()?;
    let tenants = TenantRepository::new(service.client(), service.token());
    let found = match tenant.parse::<TenantId>() {
        Ok(id) => tenants.get(id).await?,
        Err(_) => tenants.find_by_slug(tenant).await?,
    };
    let tenant = found.ok_or_else(|| CatalogCommandError::TenantNotFound(tenant.to_owned()))?;

    let rows = prepare_rows(tenant.id, products, &tenant.taxonomy)?;
    if dry_run {
        tracing::info!(
            tenant = %tenant.slug.as_str(),
            rows = rows.len(),
            "Dry run: catalog is valid, nothing written"
        );
        return Ok(());
    }

    let saved = ProductRepository::new(service.client(), service.token())
        .upsert_many(&rows)
        .await?;
    tracing::info!(
        tenant = %tenant.slug.as_str(),
        rows = saved.len(),
        "Catalog imported"
    );
    Ok(())
}
