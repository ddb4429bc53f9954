//! # Collaborator Ports
//!
//! Traits for the three external collaborators of the checkout flow:
//! the commerce API facade, the shared cart, and the payment gateway.
//! The orchestrator only ever talks to these, which keeps the whole
//! state machine testable with fakes.

use crate::error::CheckoutResult;
use crate::model::{
    CheckoutItem, CheckoutRequest, CheckoutResponse, PaymentConfirmation, PaymentHandoff,
    PaymentPrefill, VerificationResult,
};
use crate::money::Price;
use async_trait::async_trait;
use std::sync::Arc;

/// Commerce API facade: checkout initiation, price updates, and payment
/// verification. Credentials are attached by the implementation.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Submit a checkout request for server-side validation and order
    /// creation. A `FAILED` outcome with item errors is an `Ok` response;
    /// `Err` means the call itself failed (network, 5xx).
    async fn initiate_checkout(&self, request: &CheckoutRequest)
        -> CheckoutResult<CheckoutResponse>;

    /// Update the server-side cart price for one SKU
    async fn update_price(&self, sku_code: &str, new_price: Price) -> CheckoutResult<()>;

    /// Verify a gateway-reported payment against the expected order
    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> CheckoutResult<VerificationResult>;
}

/// The shared cart's client-side interface. The orchestrator never
/// mutates the cart directly; it reads a snapshot at submission and
/// issues at most one clear after a confirmed CART-mode order.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The client's latest known cart contents
    async fn snapshot(&self) -> CheckoutResult<Vec<CheckoutItem>>;

    /// Idempotent clear of the shared cart
    async fn clear(&self) -> CheckoutResult<()>;
}

/// Terminal outcome of one gateway overlay session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The customer completed payment; verification still pending
    Completed(PaymentConfirmation),
    /// The gateway reported a payment failure
    Failed { reason: String },
    /// The customer closed the overlay without paying
    Dismissed,
}

/// Payment gateway adapter: presents the provider's UI overlay and
/// resolves to exactly one of three outcomes. The await is user-paced
/// and has no client-enforced timeout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn collect_payment(
        &self,
        handoff: &PaymentHandoff,
        prefill: &PaymentPrefill,
    ) -> CheckoutResult<PaymentOutcome>;
}

/// Type aliases for injected ports (dynamic dispatch)
pub type BoxedCommerceApi = Arc<dyn CommerceApi>;
pub type BoxedCartStore = Arc<dyn CartStore>;
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
