//! # Checkout Data Model
//!
//! Request/response types for one checkout attempt: items, shipping data,
//! server-reported item errors, the payment handoff packet, and the
//! post-payment verification result.

use crate::error::{CheckoutError, CheckoutResult, FieldError};
use crate::money::{Currency, Price};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single purchasable line in a checkout attempt.
///
/// Ephemeral; built from the shared cart snapshot or from one ad-hoc
/// "buy now" item. `unit_price` is the client's believed price, which
/// the server validates against the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutItem {
    /// SKU code identifying the product variant
    pub sku_code: String,

    /// Product name (denormalized for display)
    pub product_name: String,

    /// Client-believed unit price
    pub unit_price: Price,

    /// Quantity (>= 1)
    pub quantity: u32,

    /// Optional image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CheckoutItem {
    pub fn new(
        sku_code: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            sku_code: sku_code.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            image_url: None,
        }
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Total for this line
    pub fn line_total(&self) -> Price {
        Price::from_minor(
            self.unit_price.amount_minor * self.quantity as i64,
            self.unit_price.currency,
        )
    }

    fn validate(&self) -> CheckoutResult<()> {
        if self.quantity < 1 {
            return Err(CheckoutError::InvalidItem {
                sku_code: self.sku_code.clone(),
                message: "quantity must be at least 1".into(),
            });
        }
        if self.unit_price.amount_minor < 0 {
            return Err(CheckoutError::InvalidItem {
                sku_code: self.sku_code.clone(),
                message: "unit price must not be negative".into(),
            });
        }
        Ok(())
    }
}

/// Structured shipping address, validated locally before submission.
///
/// Serialized opaquely (as a JSON string) for transport; the backend
/// stores it without interpreting individual fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Validate all fields: everything required, email format checked.
    /// Returns every failing field so the form can highlight them all.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, "is required"));
            }
        }

        if !self.email.trim().is_empty() && !is_plausible_email(&self.email) {
            errors.push(FieldError::new("email", "invalid format"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Opaque transport form: the backend receives the address as a
    /// single JSON string field.
    pub fn to_wire_string(&self) -> CheckoutResult<String> {
        serde_json::to_string(self).map_err(|e| CheckoutError::Serialization(e.to_string()))
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// How the checkout selection was sourced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutMode {
    /// Sourced from the shared cart; successful completion clears it
    Cart,
    /// Single ad-hoc "buy now" item, bypassing the shared cart entirely
    Direct,
}

/// One checkout attempt's request.
///
/// Construct via [`CheckoutRequest::from_cart`] or
/// [`CheckoutRequest::direct`]; the constructors enforce that DIRECT mode
/// carries exactly one item and that cart-sourced and direct-sourced
/// items are never mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub mode: CheckoutMode,
    pub items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    /// Per-attempt idempotency key (prevents duplicate order records)
    pub idempotency_key: String,
}

impl CheckoutRequest {
    /// Build a CART-mode request from a cart snapshot
    pub fn from_cart(
        items: Vec<CheckoutItem>,
        shipping_address: ShippingAddress,
    ) -> CheckoutResult<Self> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        for item in &items {
            item.validate()?;
        }
        Ok(Self {
            mode: CheckoutMode::Cart,
            items,
            shipping_address,
            idempotency_key: Uuid::new_v4().to_string(),
        })
    }

    /// Build a DIRECT-mode ("buy now") request carrying exactly one item
    pub fn direct(item: CheckoutItem, shipping_address: ShippingAddress) -> CheckoutResult<Self> {
        item.validate()?;
        Ok(Self {
            mode: CheckoutMode::Direct,
            items: vec![item],
            shipping_address,
            idempotency_key: Uuid::new_v4().to_string(),
        })
    }

    /// Sum of line totals (display only; the server recomputes)
    pub fn subtotal(&self) -> Price {
        let currency = self
            .items
            .first()
            .map(|i| i.unit_price.currency)
            .unwrap_or_default();
        let minor: i64 = self.items.iter().map(|i| i.line_total().amount_minor).sum();
        Price::from_minor(minor, currency)
    }

    /// Fold reconciled prices into the request before re-submission
    pub(crate) fn apply_price(&mut self, sku_code: &str, new_price: Price) {
        for item in &mut self.items {
            if item.sku_code == sku_code {
                item.unit_price = new_price;
            }
        }
    }
}

/// Server verdict on a checkout initiation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitiationOutcome {
    Success,
    Failed,
}

/// Per-SKU reason the server rejected a checkout attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemErrorReason {
    SkuNotFound,
    ProductDisabled,
    ProductDeleted,
    VariantDisabled,
    VariantDeleted,
    PriceMismatch,
}

impl ItemErrorReason {
    /// Fixed human-readable text shown next to the offending item
    pub fn describe(&self) -> &'static str {
        match self {
            ItemErrorReason::SkuNotFound => "Product could not be found",
            ItemErrorReason::ProductDisabled => "Product is currently unavailable",
            ItemErrorReason::ProductDeleted => "Product has been removed",
            ItemErrorReason::VariantDisabled => "Selected option is currently unavailable",
            ItemErrorReason::VariantDeleted => "Selected option has been removed",
            ItemErrorReason::PriceMismatch => "Price has changed",
        }
    }

    /// Soft errors have a guided remediation path; hard errors require
    /// manual cart editing.
    pub fn is_soft(&self) -> bool {
        matches!(self, ItemErrorReason::PriceMismatch)
    }
}

/// A per-SKU rejection from checkout initiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemError {
    pub sku_code: String,
    pub reason: ItemErrorReason,
    /// Present only for `PriceMismatch`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Price>,
}

/// Response from the checkout initiation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub outcome: InitiationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    /// Authoritative order amount (minor units; converted from the wire's
    /// major-unit figure exactly once at decode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub item_errors: Vec<ItemError>,
}

impl CheckoutResponse {
    /// Partition item errors into (price mismatches, hard errors).
    ///
    /// A `PriceMismatch` entry missing its `current_price` cannot be
    /// auto-remediated and is treated as hard.
    pub fn partition_item_errors(&self) -> (Vec<&ItemError>, Vec<&ItemError>) {
        let mut mismatches = Vec::new();
        let mut hard = Vec::new();
        for err in &self.item_errors {
            if err.reason.is_soft() && err.current_price.is_some() {
                mismatches.push(err);
            } else {
                hard.push(err);
            }
        }
        (mismatches, hard)
    }
}

/// Data packet handed to the external payment provider's UI overlay.
///
/// Built exactly once per SUCCESS outcome; `amount_minor` is already in
/// the smallest currency unit and is never converted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHandoff {
    pub gateway_order_id: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub description: String,
}

impl PaymentHandoff {
    /// Build the handoff from a SUCCESS initiation response
    pub fn from_response(response: &CheckoutResponse) -> CheckoutResult<Self> {
        let gateway_order_id = response.gateway_order_id.clone().ok_or_else(|| {
            CheckoutError::Transport("success response missing gateway order id".into())
        })?;
        let amount = response.amount.ok_or_else(|| {
            CheckoutError::Transport("success response missing amount".into())
        })?;
        Ok(Self {
            description: format!("Order {}", gateway_order_id),
            gateway_order_id,
            amount_minor: amount.amount_minor,
            currency: amount.currency,
        })
    }
}

/// Prefill data for the gateway overlay, taken from the shipping form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPrefill {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl PaymentPrefill {
    pub fn from_address(address: &ShippingAddress) -> Self {
        Self {
            name: address.name.clone(),
            email: address.email.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Gateway-reported successful payment, pending server verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Server-side confirmation that a gateway-reported payment is authentic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub order_id: String,
    pub amount: Price,
    pub status: String,
}

/// A server-reported price divergence awaiting user confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub sku_code: String,
    /// The client's believed price at submission time
    pub old_price: Price,
    /// The current catalog price
    pub new_price: Price,
}

impl PriceChange {
    /// Signed difference in minor units (positive means more expensive)
    pub fn diff_minor(&self) -> i64 {
        self.new_price.amount_minor - self.old_price.amount_minor
    }

    /// Signed difference for display, e.g. "+2.00" or "-0.50"
    pub fn diff_display(&self) -> String {
        let diff = self.diff_minor();
        let major = self.new_price.currency.from_minor_units(diff.abs());
        if diff >= 0 {
            format!("+{:.2}", major)
        } else {
            format!("-{:.2}", major)
        }
    }
}
