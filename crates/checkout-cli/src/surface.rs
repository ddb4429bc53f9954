//! # Simulated Overlay Surface
//!
//! Stands in for the real browser/webview overlay so a scripted run can
//! exercise the whole flow. The simulated result is chosen by the
//! `CHECKOUT_SIMULATE` env var: `success`, `failure`, or `dismiss`.

use async_trait::async_trait;
use checkout_core::CheckoutResult;
use checkout_razorpay::{compute_signature, CheckoutOptions, OverlayEvent, OverlaySurface};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simulate {
    Success,
    Failure,
    Dismiss,
}

impl Simulate {
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("CHECKOUT_SIMULATE").as_deref() {
            Ok("success") | Err(_) => Ok(Simulate::Success),
            Ok("failure") => Ok(Simulate::Failure),
            Ok("dismiss") => Ok(Simulate::Dismiss),
            Ok(other) => anyhow::bail!(
                "CHECKOUT_SIMULATE must be success, failure, or dismiss (got {other:?})"
            ),
        }
    }
}

/// Overlay surface that resolves immediately with the scripted event.
/// Signs its own simulated payments so the gateway's local verification
/// passes.
pub struct SimulatedSurface {
    simulate: Simulate,
    key_secret: String,
}

impl SimulatedSurface {
    pub fn new(simulate: Simulate, key_secret: impl Into<String>) -> Self {
        Self {
            simulate,
            key_secret: key_secret.into(),
        }
    }
}

#[async_trait]
impl OverlaySurface for SimulatedSurface {
    async fn load(&self) -> CheckoutResult<()> {
        info!("simulated overlay library loaded");
        Ok(())
    }

    async fn present(&self, options: &CheckoutOptions) -> CheckoutResult<OverlayEvent> {
        info!(
            order_id = %options.order_id,
            amount_minor = options.amount,
            "presenting simulated overlay"
        );
        let event = match self.simulate {
            Simulate::Success => {
                let payment_id = format!("pay_sim_{}", Uuid::new_v4().simple());
                let signature =
                    compute_signature(&self.key_secret, &options.order_id, &payment_id);
                OverlayEvent::Completed {
                    order_id: options.order_id.clone(),
                    payment_id,
                    signature,
                }
            }
            Simulate::Failure => OverlayEvent::Failed {
                reason: "simulated card decline".to_string(),
            },
            Simulate::Dismiss => OverlayEvent::Dismissed,
        };
        Ok(event)
    }
}
