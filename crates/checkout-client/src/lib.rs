//! # checkout-client
//!
//! HTTP client for the storefront commerce API. Implements the
//! `CommerceApi` and `CartStore` ports from `checkout-core` against the
//! backend's REST endpoints, keeping the wire format (camelCase keys,
//! major-unit amounts) out of the core model.

pub mod client;
pub mod config;
mod wire;

pub use client::CommerceClient;
pub use config::ApiConfig;
