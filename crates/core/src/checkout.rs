//! Checkout: turn a cart into a WhatsApp order message.
//!
//! There is no order persistence. The shopper is sent to a `wa.me` link with
//! the order pre-filled, and optionally to the tenant's MercadoPago payment
//! link.

use core::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartTotals};
use crate::tenant::PaymentSettings;

const WHATSAPP_BASE: &str = "https://wa.me";

/// How the shopper intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Arrange payment over the WhatsApp conversation.
    #[default]
    Whatsapp,
    Mercadopago,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Whatsapp => "A coordinar por WhatsApp",
            Self::Mercadopago => "MercadoPago",
            Self::Transfer => "Transferencia bancaria",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Mercadopago => "mercadopago",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shopper details collected on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// The store side of a checkout.
#[derive(Debug, Clone, Copy)]
pub struct Merchant<'a> {
    pub store_name: &'a str,
    /// WhatsApp number in any human format; only digits are kept.
    pub whatsapp: &'a str,
    pub payment: &'a PaymentSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("customer name is required")]
    MissingName,
    #[error("customer phone must contain at least {min} digits")]
    InvalidPhone { min: usize },
    #[error("store has no WhatsApp number configured")]
    MerchantUnreachable,
    #[error("payment method not accepted by this store: {0}")]
    PaymentMethodUnavailable(PaymentMethod),
}

/// Everything the storefront needs to hand the shopper off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPlan {
    pub message: String,
    pub whatsapp_url: String,
    /// MercadoPago link, when the store has one and the shopper chose it.
    pub payment_url: Option<String>,
    pub totals: CartTotals,
}

/// Minimum digits for a phone number to be dialable.
const MIN_PHONE_DIGITS: usize = 8;

/// Keep only ASCII digits.
#[must_use]
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// `https://wa.me/<digits>?text=<url-encoded text>`
#[must_use]
pub fn whatsapp_url(phone: &str, text: &str) -> String {
    format!(
        "{WHATSAPP_BASE}/{}?text={}",
        phone_digits(phone),
        urlencoding::encode(text)
    )
}

impl CustomerDetails {
    /// # Errors
    ///
    /// Returns [`CheckoutError`] for a blank name or a phone with too few digits.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }
        if phone_digits(&self.phone).len() < MIN_PHONE_DIGITS {
            return Err(CheckoutError::InvalidPhone {
                min: MIN_PHONE_DIGITS,
            });
        }
        Ok(())
    }
}

/// Render the order message.
#[must_use]
pub fn order_message(store_name: &str, cart: &Cart, customer: &CustomerDetails) -> String {
    let totals = cart.totals();
    let mut out = String::new();

    // Writing into a String never fails.
    let _ = writeln!(out, "¡Hola {store_name}! Quiero hacer el siguiente pedido:");
    out.push('\n');
    for item in cart.items() {
        let _ = writeln!(
            out,
            "• {} x {} ({}) - {}",
            item.quantity,
            item.product.name,
            item.product.code,
            item.line_total().display()
        );
    }
    out.push('\n');
    let _ = writeln!(out, "Total: {}", totals.total_price.display());
    if !totals.total_savings.is_zero() {
        let _ = writeln!(out, "Ahorro: {}", totals.total_savings.display());
    }

    out.push('\n');
    out.push_str("Mis datos:\n");
    let _ = writeln!(out, "Nombre: {}", customer.name.trim());
    let _ = writeln!(out, "Teléfono: {}", customer.phone.trim());
    if let Some(address) = non_blank(customer.address.as_deref()) {
        let _ = writeln!(out, "Dirección: {address}");
    }
    if let Some(notes) = non_blank(customer.notes.as_deref()) {
        let _ = writeln!(out, "Notas: {notes}");
    }
    let _ = write!(out, "Forma de pago: {}", customer.payment_method.label());
    out
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Validate a checkout and build the hand-off links.
///
/// # Errors
///
/// Returns [`CheckoutError`] when the cart is empty, the customer details
/// are incomplete, the store has no WhatsApp number, or the chosen payment
/// method isn't enabled.
pub fn plan_checkout(
    merchant: Merchant<'_>,
    cart: &Cart,
    customer: &CustomerDetails,
) -> Result<CheckoutPlan, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    customer.validate()?;
    if phone_digits(merchant.whatsapp).is_empty() {
        return Err(CheckoutError::MerchantUnreachable);
    }

    let payment_url = match customer.payment_method {
        PaymentMethod::Whatsapp => None,
        PaymentMethod::Mercadopago => Some(
            merchant
                .payment
                .mercadopago_url()
                .ok_or(CheckoutError::PaymentMethodUnavailable(PaymentMethod::Mercadopago))?
                .to_owned(),
        ),
        PaymentMethod::Transfer if merchant.payment.transfer_enabled => None,
        PaymentMethod::Transfer => {
            return Err(CheckoutError::PaymentMethodUnavailable(PaymentMethod::Transfer));
        }
    };

    let message = order_message(merchant.store_name, cart, customer);
    Ok(CheckoutPlan {
        whatsapp_url: whatsapp_url(merchant.whatsapp, &message),
        message,
        payment_url,
        totals: cart.totals(),
    })
}
