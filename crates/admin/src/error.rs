//! Unified error handling for admin.
//!
//! Handlers return `Result<T, AppError>`; the response body is always
//! `{"error": "<message>"}`. Server-side failures are captured to Sentry
//! before responding and never expose their details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use vitrina_core::catalog::CatalogError;
use vitrina_core::tenant::{ProductPatchError, TenantPatchError, TenantValidationError};

use crate::backend::BackendError;
use crate::services::AuthError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hosted backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// New tenant failed validation.
    #[error("Invalid tenant: {0}")]
    TenantValidation(#[from] TenantValidationError),

    /// Tenant patch was rejected.
    #[error("Invalid tenant update: {0}")]
    TenantPatch(#[from] TenantPatchError),

    /// Product patch was rejected.
    #[error("Invalid product update: {0}")]
    ProductPatch(#[from] ProductPatchError),

    /// Product failed validation.
    #[error("Invalid product: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Conflict(_) => StatusCode::CONFLICT,
        BackendError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        // The hosted token expired or was revoked; sign in again.
        BackendError::Unauthorized => StatusCode::UNAUTHORIZED,
        BackendError::Http(_) | BackendError::Api { .. } | BackendError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) | Self::Auth(AuthError::Backend(err)) => backend_status(err),
            Self::Auth(AuthError::InvalidEmail(_))
            | Self::TenantValidation(_)
            | Self::TenantPatch(_)
            | Self::ProductPatch(_)
            | Self::Catalog(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::NoAccess) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; internal details stay in the logs.
    fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY => "External service error".to_string(),
            StatusCode::TOO_MANY_REQUESTS => "Too many requests, please try again shortly".to_string(),
            _ => match self {
                Self::Backend(BackendError::Unauthorized)
                | Self::Auth(AuthError::Backend(BackendError::Unauthorized)) => {
                    "Session expired, please sign in again".to_string()
                }
                Self::Backend(BackendError::Conflict(msg)) => format!("Conflict: {msg}"),
                Self::Backend(BackendError::InvalidReference(msg)) => {
                    format!("Invalid reference: {msg}")
                }
                Self::Auth(err) => err.to_string(),
                Self::TenantValidation(err) => err.to_string(),
                Self::TenantPatch(err) => err.to_string(),
                Self::ProductPatch(err) => err.to_string(),
                Self::Catalog(err) => err.to_string(),
                Self::BadRequest(msg) | Self::Forbidden(msg) => msg.clone(),
                _ => self.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in admin user.
pub fn set_sentry_user(user_id: &str, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
