//! Shopping cart.
//!
//! A [`Cart`] is an owned value: the storefront keeps one per visitor in the
//! session and mutates it through the methods below. Items are keyed by
//! product code; a code appears at most once.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductCode};

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at most {max}")]
    QuantityTooLarge { max: u32 },
}

/// A product in the cart with its quantity (always at least 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }

    /// `(original_price − price) × quantity`, zero when not discounted.
    #[must_use]
    pub fn line_savings(&self) -> Price {
        if self.product.has_discount() {
            (self.product.original_price - self.product.price) * self.quantity
        } else {
            Price::ZERO
        }
    }
}

/// Cart totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of `price × quantity`.
    pub total_price: Price,
    /// Sum of quantities.
    pub total_items: u64,
    /// Number of different products.
    pub distinct_items: usize,
    /// Sum of per-line savings against the original price.
    pub total_savings: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product with quantity 1.
    ///
    /// Returns `false` and leaves the cart untouched when the product code
    /// is already present.
    pub fn add(&mut self, product: Product) -> bool {
        if self.contains(&product.code) {
            return false;
        }
        self.items.push(CartItem {
            product,
            quantity: 1,
        });
        true
    }

    /// Remove a product. Missing codes are ignored.
    pub fn remove(&mut self, code: &ProductCode) {
        self.items.retain(|item| &item.product.code != code);
    }

    /// Set a product's quantity. Zero or negative removes it; unknown codes
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityTooLarge`] above [`MAX_QUANTITY`]; the
    /// cart is left unchanged.
    pub fn update_quantity(&mut self, code: &ProductCode, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove(code);
            return Ok(());
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or(CartError::QuantityTooLarge { max: MAX_QUANTITY })?;
        if let Some(item) = self.items.iter_mut().find(|item| &item.product.code == code) {
            item.quantity = quantity;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn contains(&self, code: &ProductCode) -> bool {
        self.items.iter().any(|item| &item.product.code == code)
    }

    #[must_use]
    pub fn get(&self, code: &ProductCode) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.code == code)
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_price: self.items.iter().map(CartItem::line_total).sum(),
            total_items: self
                .items
                .iter()
                .map(|item| u64::from(item.quantity))
                .fold(0, u64::saturating_add),
            distinct_items: self.items.len(),
            total_savings: self.items.iter().map(CartItem::line_savings).sum(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::sample_product;

    fn code(s: &str) -> ProductCode {
        ProductCode::new(s)
    }

    #[test]
    fn test_add_twice_keeps_one_entry() {
        let mut cart = Cart::new();
        assert!(cart.add(sample_product("A", "Taladro", 100, 100)));
        assert!(!cart.add(sample_product("A", "Taladro", 100, 100)));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(&code("A")).unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_zero_is_remove() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 100));
        cart.add(sample_product("B", "Caladora", 50, 50));

        let mut removed = cart.clone();
        removed.remove(&code("A"));
        cart.update_quantity(&code("A"), 0).unwrap();
        assert_eq!(cart, removed);

        cart.update_quantity(&code("B"), -3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 100));
        cart.update_quantity(&code("A"), 4).unwrap();
        assert_eq!(cart.get(&code("A")).unwrap().quantity, 4);

        cart.update_quantity(&code("missing"), 2).unwrap();
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 100));
        cart.remove(&code("Z"));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_totals_multiply_price_by_quantity() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 200));
        cart.add(sample_product("B", "Caladora", 150, 150));
        cart.update_quantity(&code("A"), 3).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.total_price, Price::from_units(450));
        assert_eq!(totals.total_items, 4);
        assert_eq!(totals.distinct_items, 2);
        assert_eq!(totals.total_savings, Price::from_units(300));
    }

    #[test]
    fn test_update_quantity_rejects_huge_values() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 100));
        cart.add(sample_product("B", "Caladora", 50, 50));
        cart.update_quantity(&code("A"), i64::from(MAX_QUANTITY)).unwrap();

        let too_large = Err(CartError::QuantityTooLarge { max: MAX_QUANTITY });
        assert_eq!(cart.update_quantity(&code("A"), i64::MAX), too_large);
        assert_eq!(cart.update_quantity(&code("B"), 4_294_967_295), too_large);
        assert_eq!(cart.get(&code("A")).unwrap().quantity, MAX_QUANTITY);
        assert_eq!(cart.get(&code("B")).unwrap().quantity, 1);

        assert_eq!(cart.totals().total_items, u64::from(MAX_QUANTITY) + 1);
    }

    #[test]
    fn test_totals_do_not_overflow_on_stored_quantities() {
        let json = serde_json::json!({
            "items": [
                { "product": sample_product("A", "Taladro", 1, 1), "quantity": u32::MAX },
                { "product": sample_product("B", "Caladora", 1, 1), "quantity": u32::MAX },
            ]
        });
        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.totals().total_items, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 100));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_cart_survives_session_serialization() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Taladro", 100, 100));
        let json = serde_json::to_value(&cart).unwrap();
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
