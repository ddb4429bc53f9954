//! # checkout-razorpay
//!
//! Razorpay overlay adapter for storefront-checkout-rs. Implements the
//! `PaymentGateway` port: lazy one-time load of the provider's checkout
//! library, overlay session presentation via an injected
//! [`OverlaySurface`], and local HMAC verification of completed-payment
//! signatures.

pub mod config;
pub mod overlay;
mod signature;

pub use config::RazorpayConfig;
pub use overlay::{CheckoutOptions, OverlayEvent, OverlayPrefill, OverlaySurface, RazorpayGateway};
pub use signature::compute_signature;
