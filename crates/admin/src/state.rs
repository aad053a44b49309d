//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::{BackendClient, BackendError};
use crate::config::AdminConfig;
use crate::services::{AuthError, AuthService, DemoUsers};

/// Errors raised while building [`AppState`].
#[derive(Debug, Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),

    #[error("demo users: {0}")]
    DemoUsers(#[from] AuthError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    auth: AuthService,
}

impl AppState {
    /// Build the backend client and load the demo accounts, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the HTTP client can't be built or the demo
    /// accounts file is unreadable or malformed.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let backend = BackendClient::new(&config.backend)?;
        let demo = config
            .demo_users_file
            .as_deref()
            .map(DemoUsers::load)
            .transpose()?;
        if let Some(demo) = &demo {
            tracing::warn!(accounts = demo.len(), "Demo accounts enabled");
        }
        let auth = AuthService::new(backend.clone(), demo);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                auth,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
