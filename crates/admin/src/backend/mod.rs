//! Client for the hosted database service.
//!
//! Two halves share one HTTP client:
//!
//! - [`BackendClient::select`] and friends speak the REST API
//!   (`/rest/v1/{table}`), filtering with PostgREST query syntax such as
//!   `slug=eq.foo` and asking for written rows back with
//!   `Prefer: return=representation`. Listings are fetched page by page,
//!   since the service caps how many rows one response may carry.
//! - [`auth`] speaks the auth API (`/auth/v1`).
//!
//! Every request carries the anonymous key as `apikey`. The bearer is the
//! signed-in user's access token when there is one, so the service's
//! row-level security sees the real user; demo sessions fall back to the
//! anonymous key.

pub mod auth;

use std::sync::Arc;

use reqwest::header::{CONTENT_RANGE, HeaderMap};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::BackendConfig;

/// Postgres unique-violation code.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres foreign-key-violation code.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Rows asked for per request when listing.
pub const PAGE_SIZE: usize = 1000;

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

    /// A foreign key rejected the write (e.g. an unknown owner).
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

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

/// Error body of either API. REST uses `message`; auth uses `msg` or
/// `error_description`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default, alias = "msg", alias = "error_description")]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Map a non-success response onto [`BackendError`].
pub(crate) fn classify_error(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> BackendError {
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

    // Both violations arrive as 409.
    if parsed.code.as_deref() == Some(FOREIGN_KEY_VIOLATION) {
        return BackendError::InvalidReference(message);
    }
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

/// Client for the hosted REST and auth APIs.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_url: String,
    auth_url: String,
    anon_key: String,
}

impl BackendClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let root = config.url.as_str().trim_end_matches('/');

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                rest_url: format!("{root}/rest/v1"),
                auth_url: format!("{root}/auth/v1"),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        })
    }

    /// Attach the `apikey` header and a bearer token.
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(token.unwrap_or(&self.inner.anon_key))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.inner.rest_url)
    }

    /// `GET /rest/v1/{table}`, following pages until every matching row is
    /// in.
    ///
    /// A query with its own `limit` is sent once as is. Otherwise pages of
    /// [`PAGE_SIZE`] are requested with `limit`/`offset` and
    /// `Prefer: count=exact`; the total from `Content-Range` says when to
    /// stop, so a service capping responses below [`PAGE_SIZE`] still
    /// yields everything. Without an `order` the rows are ordered by `id`
    /// to keep pages stable.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if a request fails or rows don't parse.
    #[instrument(skip(self, token, query))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        if query.iter().any(|(key, _)| *key == "limit") {
            let request = self.inner.client.get(self.table_url(table)).query(query);
            let (_, body) = send_with_headers(self.authorize(request, token), table).await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let mut base = query.to_vec();
        if !base.iter().any(|(key, _)| *key == "order") {
            base.push(("order", "id.asc".to_string()));
        }

        let mut rows: Vec<T> = Vec::new();
        loop {
            let request = self
                .inner
                .client
                .get(self.table_url(table))
                .query(&base)
                .query(&[("limit", PAGE_SIZE), ("offset", rows.len())])
                .header("Prefer", "count=exact");
            let (headers, body) = send_with_headers(self.authorize(request, token), table).await?;
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
            tracing::debug!(table, fetched = rows.len(), "Fetching next page");
        }
    }

    /// `POST /rest/v1/{table}` returning the inserted rows.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Conflict`] on a unique violation, or another
    /// [`BackendError`] if the request fails.
    #[instrument(skip(self, token, row))]
    pub async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        table: &str,
        row: &B,
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .inner
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let body = send(self.authorize(request, token), table).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `PATCH /rest/v1/{table}?{filter}` returning the updated rows.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or rows don't parse.
    #[instrument(skip(self, token, query, changes))]
    pub async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        table: &str,
        query: &[(&str, String)],
        changes: &B,
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .inner
            .client
            .patch(self.table_url(table))
            .query(query)
            .header("Prefer", "return=representation")
            .json(changes);
        let body = send(self.authorize(request, token), table).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `POST /rest/v1/{table}?on_conflict={columns}` merging rows that hit
    /// the conflict target instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or rows don't parse.
    #[instrument(skip(self, token, rows), fields(rows = rows.len()))]
    pub async fn upsert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        table: &str,
        on_conflict: &str,
        rows: &[B],
    ) -> Result<Vec<T>, BackendError> {
        let request = self
            .inner
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(rows);
        let body = send(self.authorize(request, token), table).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `DELETE /rest/v1/{table}?{filter}`; returns how many rows went away.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails.
    #[instrument(skip(self, token, query))]
    pub async fn delete(
        &self,
        token: Option<&str>,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<usize, BackendError> {
        let request = self
            .inner
            .client
            .delete(self.table_url(table))
            .query(query)
            .header("Prefer", "return=representation");
        let body = send(self.authorize(request, token), table).await?;
        let deleted: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        Ok(deleted.len())
    }
}

/// Send a request and return the body of a success response.
async fn send(request: RequestBuilder, target: &str) -> Result<String, BackendError> {
    send_with_headers(request, target).await.map(|(_, body)| body)
}

/// Like [`send`], keeping the response headers.
async fn send_with_headers(
    request: RequestBuilder,
    target: &str,
) -> Result<(HeaderMap, String), BackendError> {
    let response = request.send().await?;

    let status = response.status();
    let headers = response.headers().clone();
    let retry_after = headers
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(
            status = %status,
            target,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(classify_error(status, retry_after, &body));
    }

    Ok((headers, body))
}

/// Total row count from `Content-Range: 0-999/1234`; `None` when the
/// service didn't count (`0-999/*`) or sent no header.
pub(crate) fn content_range_total(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit_once('/')?
        .1
        .parse()
        .ok()
}

/// PostgREST `eq` filter value.
pub(crate) fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// PostgREST `in` filter value.
pub(crate) fn in_list<T: std::fmt::Display>(values: &[T]) -> String {
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}
