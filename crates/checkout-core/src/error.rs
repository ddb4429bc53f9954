//! # Checkout Error Types
//!
//! Typed error handling for the checkout flow.
//! All checkout operations return `Result<T, CheckoutError>`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failing field from local shipping-form validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name (e.g. "email")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Local shipping-form validation failure; never reaches the server
    #[error("shipping form invalid: {} field(s) failed validation", .0.len())]
    Form(Vec<FieldError>),

    /// Network/server failure on any call
    #[error("network error: {0}")]
    Transport(String),

    /// Payment provider reported failure (terminal for the attempt)
    #[error("payment gateway error: {0}")]
    Gateway(String),

    /// A price-update call failed during reconciliation
    #[error("price update failed for {sku_code}")]
    PriceUpdateFailed { sku_code: String },

    /// A submission is already in flight for this session
    #[error("a checkout submission is already in flight")]
    SubmissionInFlight,

    /// `confirm_price_updates` called with no pending price changes
    #[error("no pending price changes to confirm")]
    NoPendingPriceChanges,

    /// Cart-mode checkout attempted with an empty cart
    #[error("cart is empty")]
    EmptyCart,

    /// Invalid item data (zero quantity, negative price)
    #[error("invalid item {sku_code}: {message}")]
    InvalidItem { sku_code: String, message: String },

    /// Configuration errors (missing env vars, malformed keys)
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Classification attached to a terminal `Failed` checkout outcome.
///
/// Price mismatches are the only error class with an automated
/// remediation loop; everything here is terminal for the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Server rejected the checkout with a reason but no item errors
    Server,
    /// Network/server failure on a call
    Transport,
    /// Payment provider reported failure
    Gateway,
    /// A price-update call failed mid-reconciliation
    PriceUpdate,
    /// Catalog prices changed again after the bounded reconciliation cap
    PriceStillChanging,
}
