//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the visitor's [`Cart`](vitrina_core::cart::Cart).
    pub const CART: &str = "cart";
}
