//! Table access over the hosted REST API.
//!
//! # Tables
//!
//! - `owners` - Store owners (id matches the hosted auth user id)
//! - `tenants` - Store configuration, `owner_id` references `owners`
//! - `products` - Per-tenant products, cascade-deleted with their tenant
//!
//! Row-level security on the hosted side decides what the bearer may see;
//! the admin's own permission checks run before any call is made.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p vitrina-cli -- migrate
//! ```

pub mod owners;
pub mod products;
pub mod tenants;

pub use owners::OwnerRepository;
pub use products::ProductRepository;
pub use tenants::TenantRepository;

use crate::backend::BackendError;

/// First row of a `return=representation` response.
fn single<T>(rows: Vec<T>, what: &str) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(what.to_string()))
}
