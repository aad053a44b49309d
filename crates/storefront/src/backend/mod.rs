//! Read-only client for the hosted database's REST API.
//!
//! The storefront only ever holds the anonymous key, so everything here is
//! a `GET` that row-level security lets through: active tenants and their
//! products. Tenant lookups are cached with `moka` (5-minute TTL). Product
//! listings are read in pages of [`PAGE_SIZE`] until the `Content-Range`
//! total is reached.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrina_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! if let Some(tenant) = client.tenant_by_slug("herramientas-sur").await? {
//!     let products = client.products(tenant.id).await?;
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{CONTENT_RANGE, HeaderMap};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use vitrina_core::catalog::Product;
use vitrina_core::tenant::{TenantConfig, TenantProduct};
use vitrina_core::TenantId;

use crate::config::BackendConfig;

/// Postgres unique-violation code.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors that can occur when talking to the hosted service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error body.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or rejected credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// PostgREST error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Map a non-success response onto [`BackendError`].
fn classify_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> BackendError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return BackendError::RateLimited(retry_after.unwrap_or(1));
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return BackendError::Unauthorized;
    }

    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.details)
        .unwrap_or_else(|| body.chars().take(200).collect());

    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
        return BackendError::Conflict(message);
    }
    if status == StatusCode::NOT_FOUND {
        return BackendError::NotFound(message);
    }
    BackendError::Api {
        status: status.as_u16(),
        code: parsed.code,
        message,
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the hosted REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and tenant cache.
/// Rows asked for per request when listing.
pub const PAGE_SIZE: usize = 1000;

#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
    tenants: Cache<String, Arc<TenantConfig>>,
}

impl BackendClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let tenants = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                rest_url: format!("{}/rest/v1", config.url.as_str().trim_end_matches('/')),
                anon_key: config.anon_key.expose_secret().to_string(),
                tenants,
            }),
        })
    }

    fn get(&self, table: &str) -> RequestBuilder {
        self.inner
            .client
            .get(format!("{}/{table}", self.inner.rest_url))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
    }

    /// `GET /rest/v1/{table}` with PostgREST query filters.
    ///
    /// Queries carrying their own `limit` go out once. Anything else is read
    /// page by page with `Prefer: count=exact` until the `Content-Range`
    /// total is in (or a short page arrives when the service didn't count).
    /// Without an `order`, rows are ordered by `id` to keep pages stable.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        if query.iter().any(|(key, _)| *key == "limit") {
            let (_, body) = send(self.get(table).query(query), table).await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let mut base = query.to_vec();
        if !base.iter().any(|(key, _)| *key == "order") {
            base.push(("order", "id.asc".to_string()));
        }

        let mut rows: Vec<T> = Vec::new();
        loop {
            let request = self
                .get(table)
                .query(&base)
                .query(&[("limit", PAGE_SIZE), ("offset", rows.len())])
                .header("Prefer", "count=exact");
            let (headers, body) = send(request, table).await?;
            let page: Vec<T> = serde_json::from_str(&body)?;
            let fetched = page.len();
            rows.extend(page);

            let done = match content_range_total(&headers) {
                Some(total) => rows.len() >= total,
                None => fetched < PAGE_SIZE,
            };
            if done || fetched == 0 {
                return Ok(rows);
            }
        }
    }

    /// Look up a tenant by slug.
    ///
    /// Found tenants are cached; misses are not, so a store created a
    /// moment ago shows up on the next request.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn tenant_by_slug(&self, slug: &str) -> Result<Option<Arc<TenantConfig>>, BackendError> {
        if let Some(tenant) = self.inner.tenants.get(slug).await {
            debug!("Cache hit for tenant");
            return Ok(Some(tenant));
        }

        let rows: Vec<TenantConfig> = self
            .select(
                "tenants",
                &[
                    ("select", "*".to_string()),
                    ("slug", format!("eq.{slug}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        let Some(tenant) = rows.into_iter().next() else {
            return Ok(None);
        };
        let tenant = Arc::new(tenant);
        self.inner
            .tenants
            .insert(slug.to_string(), Arc::clone(&tenant))
            .await;
        Ok(Some(tenant))
    }

    /// All products of a tenant, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or a row doesn't parse.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn products(&self, tenant_id: TenantId) -> Result<Vec<Product>, BackendError> {
        let rows: Vec<TenantProduct> = self
            .select(
                "products",
                &[
                    ("select", "*".to_string()),
                    ("tenant_id", format!("eq.{tenant_id}")),
                    ("order", "created_at.asc,code.asc".to_string()),
                ],
            )
            .await?;

        debug!(count = rows.len(), "Fetched products");
        Ok(rows.into_iter().map(|row| row.product).collect())
    }
}

/// Send a request, returning headers and body of a success response.
async fn send(request: RequestBuilder, table: &str) -> Result<(HeaderMap, String), BackendError> {
    let response = request.send().await?;

    let status = response.status();
    let headers = response.headers().clone();
    let retry_after = headers
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            table,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(classify_error(status, retry_after, &body));
    }

    Ok((headers, body))
}

/// Total from `Content-Range: 0-999/1234`, if the service counted.
fn content_range_total(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit_once('/')?
        .1
        .parse()
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse(&server.uri()).unwrap(),
            anon_key: SecretString::from("anon-test-key"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn tenant_row() -> serde_json::Value {
        json!({
            "id": "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1",
            "slug": "herramientas-sur",
            "name": "Herramientas Sur",
            "owner_id": "0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33",
            "status": "active",
            "business": { "whatsapp": "+54 9 11 5555-0000" },
            "created_at": "2025-01-10T12:00:00Z",
            "updated_at": "2025-01-10T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_tenant_by_slug_sends_keys_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tenants"))
            .and(query_param("slug", "eq.herramientas-sur"))
            .and(header("apikey", "anon-test-key"))
            .and(header("authorization", "Bearer anon-test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([tenant_row()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let first = client.tenant_by_slug("herramientas-sur").await.unwrap().unwrap();
        let second = client.tenant_by_slug("herramientas-sur").await.unwrap().unwrap();

        assert_eq!(first.name, "Herramientas Sur");
        assert_eq!(first.id, second.id);
        assert_eq!(
            first.business.whatsapp.as_deref(),
            Some("+54 9 11 5555-0000")
        );
    }

    #[tokio::test]
    async fn test_tenant_by_slug_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tenants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let tenant = client(&server).tenant_by_slug("no-existe").await.unwrap();
        assert!(tenant.is_none());
    }

    #[tokio::test]
    async fn test_products_parse_numeric_prices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("tenant_id", "eq.6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "3d7c1a2b-1111-4a4a-9b9b-222233334444",
                "tenant_id": "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1",
                "code": "MK-1",
                "name": "Taladro Makita HP1640",
                "condition": "Nuevo",
                "original_price": 120000,
                "price": 90000,
                "stock": 3,
                "category": "taladros",
                "brand": "makita",
                "created_at": "2025-01-10T12:00:00Z"
            }])))
            .mount(&server)
            .await;

        let tenant_id: TenantId = "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1".parse().unwrap();
        let products = client(&server).products(tenant_id).await.unwrap();

        assert_eq!(products.len(), 1);
        let drill = products.first().unwrap();
        assert_eq!(drill.code.as_str(), "MK-1");
        assert!(drill.has_discount());
        assert_eq!(drill.brand.as_deref(), Some("makita"));
    }

    fn product_row(code: &str) -> serde_json::Value {
        json!({
            "id": uuid::Uuid::new_v4(),
            "tenant_id": "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1",
            "code": code,
            "name": format!("Producto {code}"),
            "condition": "Nuevo",
            "original_price": 1000,
            "price": 1000,
            "stock": 1,
            "created_at": "2025-01-10T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_products_follow_capped_pages() {
        let server = MockServer::start().await;
        // Two rows per response regardless of the requested limit.
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("order", "created_at.asc,code.asc"))
            .and(query_param("limit", PAGE_SIZE.to_string()))
            .and(query_param("offset", "0"))
            .and(header("prefer", "count=exact"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Range", "0-1/3")
                    .set_body_json(json!([product_row("A-1"), product_row("A-2")])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("offset", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Range", "2-2/3")
                    .set_body_json(json!([product_row("A-3")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tenant_id: TenantId = "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1".parse().unwrap();
        let products = client(&server).products(tenant_id).await.unwrap();

        let codes: Vec<_> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A-1", "A-2", "A-3"]);
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tenants"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(
            client.tenant_by_slug("herramientas-sur").await,
            Err(BackendError::Unauthorized)
        ));
        assert!(matches!(
            client.products(TenantId::generate()).await,
            Err(BackendError::RateLimited(7))
        ));
    }

    #[test]
    fn test_classify_unique_violation() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert!(matches!(
            classify_error(StatusCode::CONFLICT, None, body),
            BackendError::Conflict(_)
        ));

        let body = r#"{"code":"42P01","message":"relation does not exist"}"#;
        match classify_error(StatusCode::BAD_REQUEST, None, body) {
            BackendError::Api { status, code, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("42P01"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
