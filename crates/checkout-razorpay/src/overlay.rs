//! # Razorpay Overlay Gateway
//!
//! Implementation of the `PaymentGateway` port over the Razorpay
//! checkout overlay. The overlay itself (a browser widget or webview) is
//! abstracted behind [`OverlaySurface`] so the gateway's wiring — lazy
//! library load, option building, event mapping, local signature
//! checking — is testable without a UI.

use crate::config::RazorpayConfig;
use crate::signature::verify_signature;
use async_trait::async_trait;
use checkout_core::{
    CheckoutError, CheckoutResult, PaymentConfirmation, PaymentGateway, PaymentHandoff,
    PaymentOutcome, PaymentPrefill,
};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Options handed to the Razorpay overlay for one payment session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOptions {
    /// Publishable key id
    pub key: String,
    /// Amount in the smallest currency unit, already converted upstream
    pub amount: i64,
    pub currency: String,
    /// Store name shown in the overlay header
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: OverlayPrefill,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Terminal event reported by one overlay session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    /// The customer paid; fields echo Razorpay's success handler payload
    Completed {
        order_id: String,
        payment_id: String,
        signature: String,
    },
    /// The overlay reported a payment failure
    Failed { reason: String },
    /// The customer closed the overlay without paying
    Dismissed,
}

/// The overlay host: loads the provider's checkout library and presents
/// payment sessions. Implementations wrap a webview or browser runtime.
#[async_trait]
pub trait OverlaySurface: Send + Sync {
    /// Fetch and initialize the provider's checkout library
    async fn load(&self) -> CheckoutResult<()>;

    /// Present the overlay and wait (user-paced, no timeout) for its
    /// terminal event
    async fn present(&self, options: &CheckoutOptions) -> CheckoutResult<OverlayEvent>;
}

/// Razorpay overlay payment gateway.
///
/// Loads the checkout library at most once per process, then presents
/// one overlay session per `collect_payment` call. A completed payment
/// is signature-checked locally before being reported upstream; the
/// server's own verification remains authoritative.
pub struct RazorpayGateway<S: OverlaySurface> {
    config: RazorpayConfig,
    surface: S,
    loaded: OnceCell<()>,
}

impl<S: OverlaySurface> RazorpayGateway<S> {
    pub fn new(config: RazorpayConfig, surface: S) -> Self {
        Self {
            config,
            surface,
            loaded: OnceCell::new(),
        }
    }

    fn build_options(&self, handoff: &PaymentHandoff, prefill: &PaymentPrefill) -> CheckoutOptions {
        CheckoutOptions {
            key: self.config.key_id.clone(),
            amount: handoff.amount_minor,
            currency: handoff.currency.as_str().to_string(),
            name: self.config.store_name.clone(),
            description: handoff.description.clone(),
            order_id: handoff.gateway_order_id.clone(),
            prefill: OverlayPrefill {
                name: prefill.name.clone(),
                email: prefill.email.clone(),
                contact: prefill.phone.clone(),
            },
        }
    }

    async fn ensure_loaded(&self) -> CheckoutResult<()> {
        self.loaded
            .get_or_try_init(|| async {
                debug!("loading Razorpay checkout library");
                self.surface.load().await
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<S: OverlaySurface> PaymentGateway for RazorpayGateway<S> {
    #[instrument(skip(self, handoff, prefill), fields(order_id = %handoff.gateway_order_id))]
    async fn collect_payment(
        &self,
        handoff: &PaymentHandoff,
        prefill: &PaymentPrefill,
    ) -> CheckoutResult<PaymentOutcome> {
        self.ensure_loaded()
            .await
            .map_err(|e| CheckoutError::Gateway(format!("checkout library unavailable: {e}")))?;

        let options = self.build_options(handoff, prefill);
        info!(amount_minor = options.amount, "presenting payment overlay");

        let event = self.surface.present(&options).await?;
        match event {
            OverlayEvent::Completed {
                order_id,
                payment_id,
                signature,
            } => {
                if order_id != handoff.gateway_order_id {
                    warn!(reported = %order_id, "overlay reported a different order id");
                    return Ok(PaymentOutcome::Failed {
                        reason: "payment reported for a different order".to_string(),
                    });
                }
                if !verify_signature(&self.config.key_secret, &order_id, &payment_id, &signature) {
                    warn!(payment_id = %payment_id, "payment signature mismatch");
                    return Ok(PaymentOutcome::Failed {
                        reason: "payment signature verification failed".to_string(),
                    });
                }
                info!(payment_id = %payment_id, "overlay reported completed payment");
                Ok(PaymentOutcome::Completed(PaymentConfirmation {
                    gateway_order_id: order_id,
                    payment_id,
                    signature,
                }))
            }
            OverlayEvent::Failed { reason } => {
                warn!("overlay reported payment failure: {reason}");
                Ok(PaymentOutcome::Failed { reason })
            }
            OverlayEvent::Dismissed => {
                debug!("overlay dismissed");
                Ok(PaymentOutcome::Dismissed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::compute_signature;
    use checkout_core::Currency;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSurface {
        loads: AtomicUsize,
        events: Mutex<Vec<OverlayEvent>>,
        seen_options: Mutex<Vec<CheckoutOptions>>,
    }

    impl FakeSurface {
        fn with_events(events: Vec<OverlayEvent>) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                events: Mutex::new(events),
                seen_options: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OverlaySurface for FakeSurface {
        async fn load(&self) -> CheckoutResult<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn present(&self, options: &CheckoutOptions) -> CheckoutResult<OverlayEvent> {
            self.seen_options.lock().unwrap().push(options.clone());
            Ok(self.events.lock().unwrap().remove(0))
        }
    }

    fn config() -> RazorpayConfig {
        RazorpayConfig::new("rzp_test_abc", "secret", "Demo Store")
    }

    fn handoff() -> PaymentHandoff {
        PaymentHandoff {
            gateway_order_id: "order_1".into(),
            amount_minor: 3159,
            currency: Currency::INR,
            description: "Order order_1".into(),
        }
    }

    fn prefill() -> PaymentPrefill {
        PaymentPrefill {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: "+91 98450 00000".into(),
        }
    }

    fn completed_event() -> OverlayEvent {
        OverlayEvent::Completed {
            order_id: "order_1".into(),
            payment_id: "pay_1".into(),
            signature: compute_signature("secret", "order_1", "pay_1"),
        }
    }

    #[tokio::test]
    async fn test_completed_payment_with_valid_signature() {
        let gateway = RazorpayGateway::new(config(), FakeSurface::with_events(vec![
            completed_event(),
        ]));

        let outcome = gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        match outcome {
            PaymentOutcome::Completed(confirmation) => {
                assert_eq!(confirmation.payment_id, "pay_1");
                assert_eq!(confirmation.gateway_order_id, "order_1");
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_signature_is_payment_failure() {
        let gateway = RazorpayGateway::new(
            config(),
            FakeSurface::with_events(vec![OverlayEvent::Completed {
                order_id: "order_1".into(),
                payment_id: "pay_1".into(),
                signature: "f".repeat(64),
            }]),
        );

        let outcome = gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        assert!(matches!(
            outcome,
            PaymentOutcome::Failed { reason } if reason.contains("signature")
        ));
    }

    #[tokio::test]
    async fn test_mismatched_order_id_is_payment_failure() {
        let gateway = RazorpayGateway::new(
            config(),
            FakeSurface::with_events(vec![OverlayEvent::Completed {
                order_id: "order_other".into(),
                payment_id: "pay_1".into(),
                signature: compute_signature("secret", "order_other", "pay_1"),
            }]),
        );

        let outcome = gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_library_loads_once_across_sessions() {
        let gateway = RazorpayGateway::new(
            config(),
            FakeSurface::with_events(vec![OverlayEvent::Dismissed, completed_event()]),
        );

        gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        assert_eq!(gateway.surface.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_options_carry_minor_units_and_prefill() {
        let gateway = RazorpayGateway::new(
            config(),
            FakeSurface::with_events(vec![OverlayEvent::Dismissed]),
        );

        gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        let seen = gateway.surface.seen_options.lock().unwrap();
        assert_eq!(seen[0].amount, 3159);
        assert_eq!(seen[0].currency, "INR");
        assert_eq!(seen[0].key, "rzp_test_abc");
        assert_eq!(seen[0].prefill.contact, "+91 98450 00000");
        assert_eq!(seen[0].name, "Demo Store");
    }

    #[tokio::test]
    async fn test_failed_and_dismissed_events_map_through() {
        let gateway = RazorpayGateway::new(
            config(),
            FakeSurface::with_events(vec![
                OverlayEvent::Failed {
                    reason: "card declined".into(),
                },
                OverlayEvent::Dismissed,
            ]),
        );

        let outcome = gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        assert_eq!(
            outcome,
            PaymentOutcome::Failed {
                reason: "card declined".into()
            }
        );

        let outcome = gateway.collect_payment(&handoff(), &prefill()).await.unwrap();
        assert_eq!(outcome, PaymentOutcome::Dismissed);
    }
}
