//! # Razorpay Configuration
//!
//! Configuration management for the Razorpay overlay integration.
//! All secrets are loaded from environment variables.

use checkout_core::CheckoutError;
use std::env;

/// Razorpay API configuration
#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// Key ID (rzp_test_... or rzp_live_...)
    pub key_id: String,

    /// Key secret used for payment signature verification
    pub key_secret: String,

    /// Store name shown in the overlay header
    pub store_name: String,
}

impl RazorpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `RAZORPAY_KEY_ID`
    /// - `RAZORPAY_KEY_SECRET`
    ///
    /// Optional:
    /// - `RAZORPAY_STORE_NAME` (defaults to "Storefront")
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let key_id = env::var("RAZORPAY_KEY_ID")
            .map_err(|_| CheckoutError::Config("RAZORPAY_KEY_ID not set".to_string()))?;

        let key_secret = env::var("RAZORPAY_KEY_SECRET")
            .map_err(|_| CheckoutError::Config("RAZORPAY_KEY_SECRET not set".to_string()))?;

        // Validate key format
        if !key_id.starts_with("rzp_test_") && !key_id.starts_with("rzp_live_") {
            return Err(CheckoutError::Config(
                "RAZORPAY_KEY_ID must start with rzp_test_ or rzp_live_".to_string(),
            ));
        }

        let store_name =
            env::var("RAZORPAY_STORE_NAME").unwrap_or_else(|_| "Storefront".to_string());

        Ok(Self {
            key_id,
            key_secret,
            store_name,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        store_name: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            store_name: store_name.into(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.key_id.starts_with("rzp_live_")
    }
}
