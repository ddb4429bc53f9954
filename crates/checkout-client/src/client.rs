//! # Commerce API Client
//!
//! HTTP implementation of the [`CommerceApi`] and [`CartStore`] ports
//! against the storefront backend.

use crate::config::ApiConfig;
use crate::wire::{
    WireApiError, WireCart, WireCheckoutRequest, WireCheckoutResponse, WirePriceUpdate,
    WireVerifyRequest, WireVerifyResponse,
};
use async_trait::async_trait;
use checkout_core::{
    CartStore, CheckoutError, CheckoutItem, CheckoutRequest, CheckoutResponse, CheckoutResult,
    CommerceApi, Currency, PaymentConfirmation, Price, VerificationResult,
};
use reqwest::Client;
use tracing::{debug, error, info, instrument};

/// Client for the storefront commerce API.
///
/// Attaches the bearer token to every request and keeps all wire-format
/// concerns behind the core ports.
pub struct CommerceClient {
    config: ApiConfig,
    client: Client,
    /// Fallback for wire payloads that omit their currency
    currency: Currency,
}

impl CommerceClient {
    /// Create a new commerce client
    pub fn new(config: ApiConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            currency: Currency::default(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = ApiConfig::from_env()?;
        Self::new(config)
    }

    /// Builder: set the fallback currency for wire decoding
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn read_body(response: reqwest::Response) -> CheckoutResult<(reqwest::StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl CommerceApi for CommerceClient {
    #[instrument(skip(self, request), fields(mode = ?request.mode, items = request.items.len()))]
    async fn initiate_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> CheckoutResult<CheckoutResponse> {
        let wire = WireCheckoutRequest::encode(request)?;

        debug!("initiating checkout");
        let response = self
            .client
            .post(self.url("/api/v1/checkout"))
            .header("Authorization", self.config.auth_header())
            .header("Idempotency-Key", &request.idempotency_key)
            .json(&wire)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            error!("checkout initiation rejected: status={}, body={}", status, body);
            return Err(WireApiError::from_body(status, &body));
        }

        let wire: WireCheckoutResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("failed to parse checkout response: {e}"))
        })?;

        let decoded = wire.decode(self.currency);
        info!(outcome = ?decoded.outcome, "checkout initiation response");
        Ok(decoded)
    }

    #[instrument(skip(self, new_price), fields(sku = sku_code))]
    async fn update_price(&self, sku_code: &str, new_price: Price) -> CheckoutResult<()> {
        let wire = WirePriceUpdate {
            new_price: new_price.as_major(),
        };

        let response = self
            .client
            .put(self.url(&format!("/api/v1/cart/items/{}/price", sku_code)))
            .header("Authorization", self.config.auth_header())
            .json(&wire)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            error!("price update rejected: status={}, body={}", status, body);
            return Err(CheckoutError::PriceUpdateFailed {
                sku_code: sku_code.to_string(),
            });
        }
        debug!("price updated");
        Ok(())
    }

    #[instrument(skip(self, confirmation), fields(order_id = %confirmation.gateway_order_id))]
    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> CheckoutResult<VerificationResult> {
        let wire = WireVerifyRequest::encode(confirmation);

        let response = self
            .client
            .post(self.url("/api/v1/payments/verify"))
            .header("Authorization", self.config.auth_header())
            .json(&wire)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            error!("verification rejected: status={}, body={}", status, body);
            return Err(WireApiError::from_body(status, &body));
        }

        let wire: WireVerifyResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("failed to parse verification response: {e}"))
        })?;

        let decoded = wire.decode(self.currency);
        info!(verified = decoded.verified, "payment verification response");
        Ok(decoded)
    }
}

#[async_trait]
impl CartStore for CommerceClient {
    #[instrument(skip(self))]
    async fn snapshot(&self) -> CheckoutResult<Vec<CheckoutItem>> {
        let response = self
            .client
            .get(self.url("/api/v1/cart"))
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(WireApiError::from_body(status, &body));
        }

        let wire: WireCart = serde_json::from_str(&body)
            .map_err(|e| CheckoutError::Serialization(format!("failed to parse cart: {e}")))?;
        Ok(wire.decode(self.currency))
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> CheckoutResult<()> {
        let response = self
            .client
            .delete(self.url("/api/v1/cart"))
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(WireApiError::from_body(status, &body));
        }
        debug!("cart cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{InitiationOutcome, ItemErrorReason, ShippingAddress};
    use serde_json::json;
    use wiremock::matchers::{body_json_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CommerceClient {
        CommerceClient::new(ApiConfig::new(server.uri(), "tok_test"))
            .unwrap()
            .with_currency(Currency::USD)
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            street: "14 MG Road".into(),
            city: "Bengaluru".into(),
            state: "KA".into(),
            postal_code: "560001".into(),
            phone: "+91 98450 00000".into(),
        }
    }

    fn request() -> CheckoutRequest {
        let item = CheckoutItem::new("A", "Widget", Price::from_major(10.0, Currency::USD), 2);
        CheckoutRequest::direct(item, address()).unwrap()
    }

    #[tokio::test]
    async fn test_initiate_checkout_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/checkout"))
            .and(header("Authorization", "Bearer tok_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outcome": "SUCCESS",
                "gatewayOrderId": "order_9",
                "amount": 31.59,
                "currency": "USD"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.initiate_checkout(&request()).await.unwrap();
        assert_eq!(response.outcome, InitiationOutcome::Success);
        assert_eq!(response.gateway_order_id.as_deref(), Some("order_9"));
        assert_eq!(response.amount.unwrap().amount_minor, 3159);
    }

    #[tokio::test]
    async fn test_initiate_checkout_sends_idempotency_key() {
        let server = MockServer::start().await;
        let request = request();
        Mock::given(method("POST"))
            .and(path("/api/v1/checkout"))
            .and(header("Idempotency-Key", request.idempotency_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outcome": "SUCCESS",
                "gatewayOrderId": "order_9",
                "amount": 20.0,
                "currency": "USD"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.initiate_checkout(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_initiate_checkout_failed_with_item_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/checkout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outcome": "FAILED",
                "itemErrors": [
                    {"skuCode": "A", "reason": "PRICE_MISMATCH", "currentPrice": 12.0}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client.initiate_checkout(&request()).await.unwrap();
        assert_eq!(response.outcome, InitiationOutcome::Failed);
        assert_eq!(response.item_errors[0].reason, ItemErrorReason::PriceMismatch);
        assert_eq!(
            response.item_errors[0].current_price.unwrap().amount_minor,
            1200
        );
    }

    #[tokio::test]
    async fn test_initiate_checkout_server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/checkout"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.initiate_checkout(&request()).await.unwrap_err();
        match err {
            CheckoutError::Transport(msg) => assert!(msg.contains("boom")),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_price_sends_major_units() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/cart/items/A/price"))
            .and(body_json_string(r#"{"newPrice":12.0}"#))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .update_price("A", Price::from_minor(1200, Currency::USD))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_price_failure_maps_to_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/cart/items/A/price"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .update_price("A", Price::from_minor(1200, Currency::USD))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::PriceUpdateFailed { sku_code } if sku_code == "A"
        ));
    }

    #[tokio::test]
    async fn test_verify_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "verified": true,
                "orderId": "order_9",
                "amount": 31.59,
                "currency": "USD",
                "status": "paid"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .verify_payment(&PaymentConfirmation {
                gateway_order_id: "order_9".into(),
                payment_id: "pay_1".into(),
                signature: "sig".into(),
            })
            .await
            .unwrap();
        assert!(result.verified);
        assert_eq!(result.amount.amount_minor, 3159);
    }

    #[tokio::test]
    async fn test_cart_snapshot_and_clear() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currency": "USD",
                "items": [
                    {"skuCode": "A", "productName": "Widget", "unitPrice": 10.0, "quantity": 2}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/cart"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let items = client.snapshot().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price.amount_minor, 1000);

        client.clear().await.unwrap();
    }
}
