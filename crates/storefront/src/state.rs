//! Application state shared across handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use vitrina_core::TenantId;
use vitrina_core::catalog::{Catalog, Product};
use vitrina_core::tenant::TenantConfig;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("cannot read catalog file {path}: {source}")]
    CatalogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog file: {0}")]
    CatalogParse(#[from] serde_json::Error),
}

/// Where the storefront's products come from.
#[derive(Debug, Clone)]
pub enum ProductSource {
    /// A JSON product list read once at startup.
    File(Arc<Vec<Product>>),
    /// The tenant's rows in the hosted `products` table.
    Backend,
}

impl ProductSource {
    /// Read a JSON product list from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the file can't be read or parsed.
    pub fn from_file(path: &Path) -> std::result::Result<Self, StateError> {
        let json = std::fs::read_to_string(path).map_err(|source| StateError::CatalogFile {
            path: path.to_path_buf(),
            source,
        })?;
        let products: Vec<Product> = serde_json::from_str(&json)?;
        Ok(Self::File(Arc::new(products)))
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the backend client, configuration, and ingested catalogs.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    source: ProductSource,
    catalogs: Cache<TenantId, Arc<Catalog>>,
}

impl AppState {
    /// Create the application state, reading the static catalog file if
    /// one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the backend client can't be built or the
    /// catalog file is unreadable.
    pub fn new(config: StorefrontConfig) -> std::result::Result<Self, StateError> {
        let source = match &config.catalog_path {
            Some(path) => ProductSource::from_file(path)?,
            None => ProductSource::Backend,
        };
        Self::with_source(config, source)
    }

    /// Create the application state with an explicit product source.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Backend`] if the HTTP client can't be built.
    pub fn with_source(
        config: StorefrontConfig,
        source: ProductSource,
    ) -> std::result::Result<Self, StateError> {
        let backend = BackendClient::new(&config.backend)?;
        let catalogs = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                source,
                catalogs,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the hosted backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// The store this instance serves, if it exists and is publicly visible.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown or non-active store,
    /// or [`AppError::Backend`] if the lookup fails.
    pub async fn store(&self) -> Result<Arc<TenantConfig>> {
        let slug = &self.inner.config.tenant_slug;
        let tenant = self
            .inner
            .backend
            .tenant_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("store {slug}")))?;

        if !tenant.status.is_public() {
            debug!(status = %tenant.status, "Store is not public");
            return Err(AppError::NotFound(format!("store {slug}")));
        }
        Ok(tenant)
    }

    /// The store's ingested catalog, with taxonomy tags filled in from the
    /// store's taxonomy. Cached per tenant.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the products can't be fetched or fail
    /// ingestion.
    #[instrument(skip(self, tenant), fields(tenant = %tenant.slug))]
    pub async fn catalog(&self, tenant: &TenantConfig) -> Result<Arc<Catalog>> {
        if let Some(catalog) = self.inner.catalogs.get(&tenant.id).await {
            return Ok(catalog);
        }

        let products = match &self.inner.source {
            ProductSource::File(products) => products.as_ref().clone(),
            ProductSource::Backend => self.inner.backend.products(tenant.id).await?,
        };
        let catalog = Arc::new(Catalog::ingest(products, &tenant.taxonomy)?);
        debug!(products = catalog.len(), "Catalog ingested");

        self.inner
            .catalogs
            .insert(tenant.id, Arc::clone(&catalog))
            .await;
        Ok(catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_product_source_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"code":"MK-1","name":"Taladro Makita","original_price":120,"price":90,"stock":2}}]"#
        )
        .unwrap();

        let source = ProductSource::from_file(file.path()).unwrap();
        match source {
            ProductSource::File(products) => {
                assert_eq!(products.len(), 1);
                assert!(products.iter().all(|p| p.category.is_none()));
            }
            ProductSource::Backend => panic!("expected a file source"),
        }
    }

    #[test]
    fn test_product_source_missing_file() {
        let result = ProductSource::from_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(StateError::CatalogFile { .. })));
    }

    #[test]
    fn test_product_source_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            ProductSource::from_file(file.path()),
            Err(StateError::CatalogParse(_))
        ));
    }
}
