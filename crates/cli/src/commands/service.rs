//! Hosted REST access with the service key.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Hosted database service URL
//! - `BACKEND_SERVICE_KEY` - Service role key. It bypasses row-level
//!   security, so it belongs on operator machines only, never on the admin
//!   or storefront hosts.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use vitrina_admin::backend::{BackendClient, BackendError};
use vitrina_admin::config::BackendConfig;

/// Bulk operations get a longer timeout than interactive requests.
const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid BACKEND_URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A backend client authorized with the service key.
pub struct ServiceBackend {
    client: BackendClient,
    key: SecretString,
}

impl ServiceBackend {
    /// Build the client from `BACKEND_URL` and `BACKEND_SERVICE_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if a variable is missing or the URL is
    /// malformed.
    pub fn from_env() -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok();

        let url = required("BACKEND_URL")?;
        let key = SecretString::from(required("BACKEND_SERVICE_KEY")?);
        let config = BackendConfig {
            url: Url::parse(&url)?,
            anon_key: key.clone(),
            timeout: TIMEOUT,
        };

        Ok(Self {
            client: BackendClient::new(&config)?,
            key,
        })
    }

    pub const fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Bearer token for repository calls.
    pub fn token(&self) -> Option<&str> {
        Some(self.key.expose_secret())
    }
}

fn required(key: &'static str) -> Result<String, ServiceError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ServiceError::MissingEnvVar(key))
}
