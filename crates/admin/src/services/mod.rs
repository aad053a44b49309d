//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Hosted password sign-in with a demo-accounts fallback

pub mod auth;

pub use auth::{AuthError, AuthService, DemoUsers, SignedIn};
