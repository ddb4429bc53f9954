//! # Wire Types
//!
//! Request/response shapes of the storefront commerce API. The wire
//! carries amounts in major units (e.g. 12.00) with camelCase keys; this
//! module is the single place where major-unit figures are converted to
//! the minor-unit model, exactly once per decode.

use checkout_core::{
    CheckoutError, CheckoutItem, CheckoutMode, CheckoutRequest, CheckoutResponse, CheckoutResult,
    Currency, InitiationOutcome, ItemError, ItemErrorReason, PaymentConfirmation, Price,
    VerificationResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCheckoutRequest {
    pub mode: CheckoutMode,
    pub currency: Currency,
    pub items: Vec<WireItem>,
    /// The address travels as one opaque JSON string
    pub shipping_address: String,
}

impl WireCheckoutRequest {
    pub fn encode(request: &CheckoutRequest) -> CheckoutResult<Self> {
        let currency = request
            .items
            .first()
            .map(|i| i.unit_price.currency)
            .unwrap_or_default();
        Ok(Self {
            mode: request.mode,
            currency,
            items: request.items.iter().map(WireItem::encode).collect(),
            shipping_address: request.shipping_address.to_wire_string()?,
        })
    }
}

/// Sent in checkout requests and received in cart snapshots
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireItem {
    pub sku_code: String,
    pub product_name: String,
    /// Major units on the wire
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl WireItem {
    fn encode(item: &CheckoutItem) -> Self {
        Self {
            sku_code: item.sku_code.clone(),
            product_name: item.product_name.clone(),
            unit_price: item.unit_price.as_major(),
            quantity: item.quantity,
            image_url: item.image_url.clone(),
        }
    }

    fn decode(self, currency: Currency) -> CheckoutItem {
        CheckoutItem {
            sku_code: self.sku_code,
            product_name: self.product_name,
            unit_price: Price::from_major(self.unit_price, currency),
            quantity: self.quantity,
            image_url: self.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCheckoutResponse {
    pub outcome: InitiationOutcome,
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    /// Major units on the wire
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub item_errors: Vec<WireItemError>,
}

impl WireCheckoutResponse {
    /// Decode into the core model; the wire's major-unit amounts are
    /// converted to minor units here and nowhere else.
    pub fn decode(self, fallback_currency: Currency) -> CheckoutResponse {
        let currency = self.currency.unwrap_or(fallback_currency);
        CheckoutResponse {
            outcome: self.outcome,
            gateway_order_id: self.gateway_order_id,
            amount: self.amount.map(|a| Price::from_major(a, currency)),
            failure_reason: self.failure_reason,
            item_errors: self
                .item_errors
                .into_iter()
                .map(|e| e.decode(currency))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireItemError {
    pub sku_code: String,
    pub reason: ItemErrorReason,
    /// Major units on the wire; only for PRICE_MISMATCH
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl WireItemError {
    fn decode(self, currency: Currency) -> ItemError {
        ItemError {
            sku_code: self.sku_code,
            reason: self.reason,
            current_price: self.current_price.map(|p| Price::from_major(p, currency)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePriceUpdate {
    /// Major units on the wire
    pub new_price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireVerifyRequest {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl WireVerifyRequest {
    pub fn encode(confirmation: &PaymentConfirmation) -> Self {
        Self {
            gateway_order_id: confirmation.gateway_order_id.clone(),
            payment_id: confirmation.payment_id.clone(),
            signature: confirmation.signature.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireVerifyResponse {
    pub verified: bool,
    pub order_id: String,
    /// Major units on the wire
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub status: String,
}

impl WireVerifyResponse {
    pub fn decode(self, fallback_currency: Currency) -> VerificationResult {
        let currency = self.currency.unwrap_or(fallback_currency);
        VerificationResult {
            verified: self.verified,
            order_id: self.order_id,
            amount: Price::from_major(self.amount, currency),
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCart {
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub items: Vec<WireItem>,
}

impl WireCart {
    pub fn decode(self, fallback_currency: Currency) -> Vec<CheckoutItem> {
        let currency = self.currency.unwrap_or(fallback_currency);
        self.items
            .into_iter()
            .map(|i| i.decode(currency))
            .collect()
    }
}

/// Error body the storefront API returns on non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct WireApiError {
    pub message: String,
}

impl WireApiError {
    pub fn from_body(status: reqwest::StatusCode, body: &str) -> CheckoutError {
        match serde_json::from_str::<WireApiError>(body) {
            Ok(err) => CheckoutError::Transport(format!("HTTP {}: {}", status, err.message)),
            Err(_) => CheckoutError::Transport(format!("HTTP {}: {}", status, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::ShippingAddress;

    #[test]
    fn test_request_encodes_major_units_and_camel_case() {
        let item = CheckoutItem::new("SKU-1", "Widget", Price::from_minor(1250, Currency::USD), 2);
        let request = CheckoutRequest::direct(item, ShippingAddress::default()).unwrap();
        let wire = WireCheckoutRequest::encode(&request).unwrap();
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["mode"], "DIRECT");
        assert_eq!(json["items"][0]["skuCode"], "SKU-1");
        assert_eq!(json["items"][0]["unitPrice"], 12.5);
        // The address is a single opaque string field
        assert!(json["shippingAddress"].is_string());
    }

    #[test]
    fn test_response_decodes_amounts_to_minor_units() {
        let body = r#"{
            "outcome": "SUCCESS",
            "gatewayOrderId": "order_9",
            "amount": 31.59,
            "currency": "USD"
        }"#;
        let wire: WireCheckoutResponse = serde_json::from_str(body).unwrap();
        let response = wire.decode(Currency::INR);
        assert_eq!(response.amount.unwrap().amount_minor, 3159);
        assert_eq!(response.amount.unwrap().currency, Currency::USD);
    }

    #[test]
    fn test_item_error_decode() {
        let body = r#"{
            "outcome": "FAILED",
            "itemErrors": [
                {"skuCode": "A", "reason": "PRICE_MISMATCH", "currentPrice": 12.0},
                {"skuCode": "B", "reason": "PRODUCT_DELETED"}
            ]
        }"#;
        let wire: WireCheckoutResponse = serde_json::from_str(body).unwrap();
        let response = wire.decode(Currency::USD);
        assert_eq!(response.item_errors.len(), 2);
        assert_eq!(
            response.item_errors[0].current_price.unwrap().amount_minor,
            1200
        );
        assert_eq!(
            response.item_errors[1].reason,
            ItemErrorReason::ProductDeleted
        );
        assert!(response.item_errors[1].current_price.is_none());
    }

    #[test]
    fn test_missing_currency_falls_back() {
        let body = r#"{"outcome": "SUCCESS", "gatewayOrderId": "o", "amount": 10.0}"#;
        let wire: WireCheckoutResponse = serde_json::from_str(body).unwrap();
        let response = wire.decode(Currency::INR);
        assert_eq!(response.amount.unwrap().currency, Currency::INR);
    }
}
