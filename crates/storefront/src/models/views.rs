//! JSON views of core types.
//!
//! Views add the derived fields a frontend would otherwise recompute
//! (display prices, discount percent, condition tag) and drop what the
//! store's feature flags hide.

use serde::Serialize;

use vitrina_core::cart::{Cart, CartItem, CartTotals};
use vitrina_core::catalog::{Product, TaxonomyEntry};
use vitrina_core::tenant::{
    Branding, BusinessInfo, FeatureFlags, LayoutPreferences, TenantConfig,
};
use vitrina_core::{CurrencyCode, Price, ProductCode};

/// A product as shown to shoppers.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub code: ProductCode,
    pub name: String,
    pub condition: String,
    /// Normalized condition tag (`new`, `like-new`, ...).
    pub condition_tag: &'static str,
    pub price: Price,
    pub original_price: Price,
    pub price_display: String,
    pub original_price_display: String,
    /// Present only for discounted products when badges are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_label: Option<String>,
    pub description: String,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub in_stock: bool,
    /// Hidden when the store doesn't show stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    pub category: String,
    pub brand: String,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, features: &FeatureFlags) -> Self {
        let badges = features.show_discount_badges && product.has_discount();
        Self {
            code: product.code.clone(),
            name: product.name.clone(),
            condition: product.condition.clone(),
            condition_tag: product.condition_kind().tag(),
            price: product.price,
            original_price: product.original_price,
            price_display: product.price.display(),
            original_price_display: product.original_price.display(),
            discount_percent: badges.then(|| product.discount_percent()),
            discount_label: product.discount_label.clone().filter(|_| badges),
            description: product.description.clone(),
            features: product.features.clone(),
            urgency: product.urgency.clone(),
            cta: product.cta.clone(),
            image: product.image.clone(),
            in_stock: product.in_stock(),
            stock: features.show_stock.then_some(product.stock),
            category: product.category_tag().to_owned(),
            brand: product.brand_tag().to_owned(),
        }
    }
}

/// One cart line.
#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub code: ProductCode,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
    pub line_total_display: String,
}

impl From<&CartItem> for LineView {
    fn from(item: &CartItem) -> Self {
        let line_total = item.line_total();
        Self {
            code: item.product.code.clone(),
            name: item.product.name.clone(),
            image: item.product.image.clone(),
            quantity: item.quantity,
            unit_price: item.product.price,
            line_total,
            line_total_display: line_total.display(),
        }
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<LineView>,
    pub totals: CartTotals,
    pub total_display: String,
    pub savings_display: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.items().iter().map(LineView::from).collect(),
            total_display: totals.total_price.display(),
            savings_display: totals.total_savings.display(),
            totals,
        }
    }
}

/// Taxonomy entry without its matching keywords.
#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub slug: String,
    pub label: String,
}

impl From<&TaxonomyEntry> for TagView {
    fn from(entry: &TaxonomyEntry) -> Self {
        Self {
            slug: entry.slug.clone(),
            label: entry.label.clone(),
        }
    }
}

/// Payment options a shopper may pick. Bank details are only revealed in
/// the WhatsApp conversation.
#[derive(Debug, Clone, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PaymentView {
    pub currency: CurrencyCode,
    pub whatsapp: bool,
    pub mercadopago: bool,
    pub transfer: bool,
}

/// Public store information.
#[derive(Debug, Clone, Serialize)]
pub struct StoreView {
    pub slug: String,
    pub name: String,
    pub branding: Branding,
    pub business: BusinessInfo,
    pub features: FeatureFlags,
    pub payment: PaymentView,
    pub layout: LayoutPreferences,
    pub categories: Vec<TagView>,
    pub brands: Vec<TagView>,
}

impl From<&TenantConfig> for StoreView {
    fn from(tenant: &TenantConfig) -> Self {
        Self {
            slug: tenant.slug.to_string(),
            name: tenant.name.clone(),
            branding: tenant.branding.clone(),
            business: tenant.business.clone(),
            features: tenant.features,
            payment: PaymentView {
                currency: tenant.payment.currency,
                whatsapp: tenant.features.whatsapp_checkout,
                mercadopago: tenant.payment.mercadopago_url().is_some(),
                transfer: tenant.payment.transfer_enabled,
            },
            layout: tenant.layout,
            categories: tenant.taxonomy.categories.iter().map(TagView::from).collect(),
            brands: tenant.taxonomy.brands.iter().map(TagView::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vitrina_core::UserId;
    use vitrina_core::catalog::sample_product;
    use vitrina_core::tenant::sample_tenant;

    #[test]
    fn test_product_view_respects_flags() {
        let mut product = sample_product("MK-1", "Taladro Makita", 70, 100);
        product.discount_label = Some("-30%".to_owned());
        product.stock = 4;

        let view = ProductView::new(&product, &FeatureFlags::default());
        assert_eq!(view.discount_percent, Some(30));
        assert_eq!(view.stock, Some(4));
        assert_eq!(view.condition_tag, "new");
        assert_eq!(view.category, "otros");

        let hidden = FeatureFlags {
            show_stock: false,
            show_discount_badges: false,
            ..FeatureFlags::default()
        };
        let view = ProductView::new(&product, &hidden);
        assert_eq!(view.discount_percent, None);
        assert_eq!(view.discount_label, None);
        assert_eq!(view.stock, None);
        assert!(view.in_stock);
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.add(sample_product("A", "Uno", 100, 200));
        cart.update_quantity(&ProductCode::new("A"), 3).unwrap();

        let view = CartView::from(&cart);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.totals.total_price, Price::from_units(300));
        assert_eq!(view.items.first().map(|l| l.quantity), Some(3));
    }

    #[test]
    fn test_store_view_hides_bank_details() {
        let mut tenant = sample_tenant("herramientas-sur", UserId::generate());
        tenant.payment.transfer_enabled = true;
        tenant.payment.bank_cbu = Some("0000003100010000000001".to_owned());

        let json = serde_json::to_value(StoreView::from(&tenant)).unwrap();
        assert_eq!(json["payment"]["transfer"], true);
        assert!(!json.to_string().contains("0000003100010000000001"));
        assert!(json["categories"].as_array().is_some_and(|c| !c.is_empty()));
    }
}
