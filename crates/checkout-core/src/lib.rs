//! # checkout-core
//!
//! Core types and state machine for the storefront checkout and payment
//! reconciliation flow.
//!
//! This crate provides:
//! - `CheckoutOrchestrator` driving one checkout attempt end to end
//! - `CommerceApi`, `CartStore`, and `PaymentGateway` ports for the
//!   injected collaborators
//! - `CheckoutRequest`/`CheckoutResponse` and the item-error model
//! - `Price`, `Currency`, and `OrderTotals` for minor-unit money math
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutOrchestrator, CheckoutOutcome, Selection, ShippingAddress};
//!
//! let mut session = CheckoutOrchestrator::new(api, gateway, cart, Selection::Cart);
//!
//! match session.submit(address).await? {
//!     CheckoutOutcome::Confirmed(order) => println!("paid: {}", order.order_id),
//!     CheckoutOutcome::PriceChanges(changes) => {
//!         // show the reconciliation prompt, then:
//!         session.confirm_price_updates().await?;
//!     }
//!     other => eprintln!("checkout ended: {other:?}"),
//! }
//! ```

pub mod error;
pub mod model;
pub mod money;
pub mod ports;
pub mod session;

// Re-exports for convenience
pub use error::{CheckoutError, CheckoutResult, FailureKind, FieldError};
pub use model::{
    CheckoutItem, CheckoutMode, CheckoutRequest, CheckoutResponse, InitiationOutcome, ItemError,
    ItemErrorReason, PaymentConfirmation, PaymentHandoff, PaymentPrefill, PriceChange,
    ShippingAddress, VerificationResult,
};
pub use money::{Currency, OrderTotals, Price};
pub use ports::{
    BoxedCartStore, BoxedCommerceApi, BoxedPaymentGateway, CartStore, CommerceApi, PaymentGateway,
    PaymentOutcome,
};
pub use session::{
    CheckoutOrchestrator, CheckoutOutcome, OrderConfirmation, Selection, SessionState,
    VerificationStatus, DEFAULT_MAX_RECONCILE_ROUNDS,
};
