//! Response models for the storefront API.

pub mod session;
pub mod views;

pub use session::keys;
pub use views::{CartView, LineView, ProductView, StoreView};
