//! # Storefront Checkout
//!
//! Scripted checkout runner: drives one checkout attempt against the
//! storefront API with a simulated Razorpay overlay.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STOREFRONT_API_URL=https://api.example.com
//! export STOREFRONT_API_TOKEN=tok_...
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//! export CHECKOUT_SIMULATE=success   # or failure / dismiss
//!
//! # Run one scripted attempt from config/checkout.toml
//! storefront-checkout
//! ```

mod fixture;
mod surface;

use checkout_core::{
    CheckoutOrchestrator, CheckoutOutcome, OrderTotals, Price, Selection, VerificationStatus,
};
use checkout_client::CommerceClient;
use checkout_razorpay::{RazorpayConfig, RazorpayGateway};
use fixture::{CheckoutFixture, FixtureMode};
use std::sync::Arc;
use surface::{Simulate, SimulatedSurface};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    dotenvy::dotenv().ok();

    let fixture_path = std::env::args().nth(1);
    let fixture = CheckoutFixture::load(fixture_path.as_deref())?;
    let simulate = Simulate::from_env()?;

    let client = Arc::new(CommerceClient::from_env()?.with_currency(fixture.currency));
    let razorpay_config = RazorpayConfig::from_env()?;
    info!(
        test_mode = razorpay_config.is_test_mode(),
        "gateway configured"
    );

    let surface = SimulatedSurface::new(simulate, razorpay_config.key_secret.clone());
    let gateway = Arc::new(RazorpayGateway::new(razorpay_config, surface));

    let selection = match fixture.mode {
        FixtureMode::Cart => Selection::Cart,
        FixtureMode::Direct => {
            let item = fixture.direct_item()?;
            // Display estimate only; the server recomputes the amount
            let totals = OrderTotals::compute(
                item.line_total(),
                Price::from_major(fixture.flat_shipping, fixture.currency),
                fixture.tax_rate_bps,
            );
            info!(
                subtotal = %totals.subtotal.display(),
                shipping = %totals.shipping.display(),
                tax = %totals.tax.display(),
                total = %totals.total.display(),
                "order estimate"
            );
            Selection::Direct(item)
        }
    };

    let mut session =
        CheckoutOrchestrator::new(client.clone(), gateway, client.clone(), selection);

    let mut outcome = session.submit(fixture.shipping_address()).await?;
    loop {
        match outcome {
            CheckoutOutcome::PriceChanges(changes) => {
                for change in &changes {
                    warn!(
                        sku = %change.sku_code,
                        old = %change.old_price.display(),
                        new = %change.new_price.display(),
                        diff = %change.diff_display(),
                        "price changed"
                    );
                }
                info!("accepting updated prices and retrying");
                outcome = session.confirm_price_updates().await?;
            }
            terminal => {
                report(&terminal);
                break;
            }
        }
    }

    Ok(())
}

fn report(outcome: &CheckoutOutcome) {
    match outcome {
        CheckoutOutcome::Confirmed(order) => {
            info!(
                order_id = %order.order_id,
                payment_id = %order.payment_id,
                amount = %order.amount.display(),
                at = %order.confirmed_at.to_rfc3339(),
                "order confirmed"
            );
        }
        CheckoutOutcome::PendingVerification(order) => {
            debug_assert_eq!(order.status, VerificationStatus::Unverified);
            warn!(
                order_id = %order.order_id,
                payment_id = %order.payment_id,
                "payment captured but not yet verified; keep the payment id for support"
            );
        }
        CheckoutOutcome::Cancelled => {
            info!("checkout cancelled at the payment overlay");
        }
        CheckoutOutcome::ItemsRejected(errors) => {
            for err in errors {
                warn!(sku = %err.sku_code, "{}", err.reason.describe());
            }
            warn!("checkout rejected; edit the cart and retry");
        }
        CheckoutOutcome::Failed { kind, message } => {
            warn!(?kind, "checkout failed: {message}");
        }
        CheckoutOutcome::PriceChanges(_) => unreachable!("handled by the drive loop"),
    }
}

fn print_banner() {
    println!(
        r#"
  🛒 Storefront Checkout
  ━━━━━━━━━━━━━━━━━━━━━━
  Scripted checkout runner
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
