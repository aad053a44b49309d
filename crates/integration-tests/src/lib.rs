//! End-to-end tests for Vitrina.
//!
//! The tests in `tests/` talk to running services and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and seed a tenant
//! vitrina-cli migrate
//! vitrina-cli tenant create -s herramientas-sur -n "Herramientas Sur" -o <owner-uuid>
//! vitrina-cli catalog import productos.json -t herramientas-sur
//!
//! # Start both services, then
//! cargo test -p vitrina-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_URL` - Running storefront (default: `http://127.0.0.1:3000`)
//! - `ADMIN_URL` - Running admin API (default: `http://127.0.0.1:3001`)
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - An admin or demo account
//! - `DATABASE_URL` - Direct database connection for the schema tests

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::Value;

/// Shared setup for tests against running services.
pub struct TestContext {
    /// Client with a cookie store, so cart and admin sessions persist
    /// across requests.
    pub client: Client,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestContext {
    /// Build a context from the environment (and `.env` if present).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client can't be built.
    #[must_use]
    pub fn new() -> Self {
        dotenvy::dotenv().ok();

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            storefront_url: env_or("STOREFRONT_URL", "http://127.0.0.1:3000"),
            admin_url: env_or("ADMIN_URL", "http://127.0.0.1:3001"),
        }
    }

    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url.trim_end_matches('/'))
    }

    /// Sign in to the admin API with `ADMIN_TEST_EMAIL` and
    /// `ADMIN_TEST_PASSWORD`, returning the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are unset or sign-in fails.
    pub async fn admin_login(&self) -> Result<Value, Box<dyn std::error::Error>> {
        let email = std::env::var("ADMIN_TEST_EMAIL")?;
        let password = std::env::var("ADMIN_TEST_PASSWORD")?;

        let response = self
            .client
            .post(self.admin("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}
