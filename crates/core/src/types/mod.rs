//! Core value types for Vitrina.
//!
//! Type-safe wrappers for IDs, emails, prices and the status/role enums.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
