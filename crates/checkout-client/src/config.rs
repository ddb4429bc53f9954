//! # Storefront API Configuration
//!
//! Configuration management for the commerce API client.
//! All secrets are loaded from environment variables.

use checkout_core::CheckoutError;
use std::env;

/// Storefront commerce API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g. https://api.novacart.dev)
    pub base_url: String,

    /// Bearer token attached to every request
    pub api_token: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STOREFRONT_API_URL`
    /// - `STOREFRONT_API_TOKEN`
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("STOREFRONT_API_URL")
            .map_err(|_| CheckoutError::Config("STOREFRONT_API_URL not set".to_string()))?;

        let api_token = env::var("STOREFRONT_API_TOKEN")
            .map_err(|_| CheckoutError::Config("STOREFRONT_API_TOKEN not set".to_string()))?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CheckoutError::Config(
                "STOREFRONT_API_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self::new(base_url, api_token))
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_token: api_token.into(),
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_token)
    }
}
