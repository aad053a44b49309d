//! Admin authentication error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] vitrina_core::EmailError),

    /// Neither the hosted service nor the demo accounts accepted the
    /// credentials.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Signed in, but the account may not use the admin console.
    #[error("this account has no access to the admin console")]
    NoAccess,

    /// Hosted service failed for a reason other than bad credentials.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The demo accounts file couldn't be read.
    #[error("cannot read demo users file {path}: {source}")]
    DemoFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The demo accounts file is malformed.
    #[error("invalid demo users file: {0}")]
    DemoParse(String),

    /// Password hashing failed.
    #[error("password hash error: {0}")]
    Hash(String),
}
