//! # Checkout Orchestrator
//!
//! The state machine for one checkout attempt: submission, response
//! classification, the bounded price-reconciliation loop, payment
//! handoff, post-payment verification, and cart cleanup.
//!
//! ## State machine
//!
//! ```text
//! FORM_ENTRY -> SUBMITTING -> { AWAITING_PAYMENT, PRICE_MISMATCH,
//!                               VALIDATION_ERROR, GENERIC_ERROR }
//! AWAITING_PAYMENT -> PAYMENT_PENDING -> { VERIFYING -> CONFIRMED,
//!                                          VERIFICATION_SOFT_FAILED }
//!                                      | CANCELLED_BY_USER
//! ```
//!
//! The orchestrator exclusively owns the in-flight request/response pair
//! and its own state for the duration of one attempt; it reaches the
//! shared cart only through the injected [`CartStore`] port.

use crate::error::{CheckoutError, CheckoutResult, FailureKind};
use crate::model::{
    CheckoutItem, CheckoutMode, CheckoutRequest, CheckoutResponse, InitiationOutcome, ItemError,
    PaymentConfirmation, PaymentHandoff, PaymentPrefill, PriceChange, ShippingAddress,
};
use crate::money::Price;
use crate::ports::{BoxedCartStore, BoxedCommerceApi, BoxedPaymentGateway, PaymentOutcome};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

/// Automatic reconciliation cap: after this many confirmed price-update
/// rounds, a further mismatch is terminal.
pub const DEFAULT_MAX_RECONCILE_ROUNDS: u8 = 2;

/// Finite state of one checkout attempt. Held only for the attempt's
/// duration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    FormEntry,
    Submitting,
    AwaitingPayment,
    PriceMismatch,
    ValidationError,
    GenericError,
    PaymentPending,
    Verifying,
    Confirmed,
    VerificationSoftFailed,
    CancelledByUser,
}

/// What the checkout is sourced from, decided once at session entry
#[derive(Debug, Clone)]
pub enum Selection {
    /// The shared cart; snapshotted at each submission
    Cart,
    /// A single ad-hoc "buy now" item; the shared cart is never touched
    Direct(CheckoutItem),
}

/// Whether the server corroborated the gateway-reported payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    /// Payment captured by the gateway but not yet confirmed server-side
    Unverified,
}

/// The order as presented to the customer after a successful payment
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub amount: Price,
    pub status: VerificationStatus,
    pub confirmed_at: DateTime<Utc>,
}

/// Result of driving the session as far as it can go without further
/// user input.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Payment captured and verified
    Confirmed(OrderConfirmation),
    /// Payment captured; server verification could not be obtained.
    /// Surfaced as success with an unverified marker, never rolled back.
    PendingVerification(OrderConfirmation),
    /// Customer closed the gateway overlay without paying
    Cancelled,
    /// Catalog prices diverged; awaiting user confirmation to reconcile
    PriceChanges(Vec<PriceChange>),
    /// Hard item errors requiring manual cart editing
    ItemsRejected(Vec<ItemError>),
    /// Terminal failure for this attempt
    Failed { kind: FailureKind, message: String },
}

/// Drives one checkout attempt against the injected collaborator ports.
pub struct CheckoutOrchestrator {
    api: BoxedCommerceApi,
    gateway: BoxedPaymentGateway,
    cart: BoxedCartStore,
    selection: Selection,
    state: SessionState,
    address: Option<ShippingAddress>,
    in_flight: Option<CheckoutRequest>,
    pending_changes: Vec<PriceChange>,
    reconcile_rounds: u8,
    max_reconcile_rounds: u8,
}

impl CheckoutOrchestrator {
    pub fn new(
        api: BoxedCommerceApi,
        gateway: BoxedPaymentGateway,
        cart: BoxedCartStore,
        selection: Selection,
    ) -> Self {
        Self {
            api,
            gateway,
            cart,
            selection,
            state: SessionState::FormEntry,
            address: None,
            in_flight: None,
            pending_changes: Vec::new(),
            reconcile_rounds: 0,
            max_reconcile_rounds: DEFAULT_MAX_RECONCILE_ROUNDS,
        }
    }

    /// Builder: override the automatic reconciliation cap
    pub fn with_max_reconcile_rounds(mut self, rounds: u8) -> Self {
        self.max_reconcile_rounds = rounds;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> CheckoutMode {
        match self.selection {
            Selection::Cart => CheckoutMode::Cart,
            Selection::Direct(_) => CheckoutMode::Direct,
        }
    }

    /// Shipping data retained across cancellations and restarts
    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    /// Price changes awaiting `confirm_price_updates` / `cancel_price_updates`
    pub fn pending_price_changes(&self) -> &[PriceChange] {
        &self.pending_changes
    }

    /// A fresh submission is allowed from the initial state and from the
    /// terminal states a user backs out of. Anything mid-flight rejects.
    fn can_submit(&self) -> bool {
        matches!(
            self.state,
            SessionState::FormEntry
                | SessionState::CancelledByUser
                | SessionState::ValidationError
                | SessionState::GenericError
        )
    }

    /// Validate the shipping form and submit the checkout, driving the
    /// session as far as it can go without further user input.
    #[instrument(skip(self, address), fields(mode = ?self.mode()))]
    pub async fn submit(&mut self, address: ShippingAddress) -> CheckoutResult<CheckoutOutcome> {
        if !self.can_submit() {
            return Err(CheckoutError::SubmissionInFlight);
        }
        address.validate().map_err(CheckoutError::Form)?;

        let request = match &self.selection {
            Selection::Cart => {
                let items = self.cart.snapshot().await?;
                CheckoutRequest::from_cart(items, address.clone())?
            }
            Selection::Direct(item) => CheckoutRequest::direct(item.clone(), address.clone())?,
        };

        self.address = Some(address);
        self.pending_changes.clear();
        self.reconcile_rounds = 0;
        self.submit_request(request).await
    }

    /// User confirmed the reconciliation prompt: push each new price to
    /// the server sequentially (in item-list order), then re-submit.
    #[instrument(skip(self))]
    pub async fn confirm_price_updates(&mut self) -> CheckoutResult<CheckoutOutcome> {
        if self.state != SessionState::PriceMismatch || self.pending_changes.is_empty() {
            return Err(CheckoutError::NoPendingPriceChanges);
        }
        let changes = std::mem::take(&mut self.pending_changes);
        self.reconcile_rounds += 1;

        for change in &changes {
            debug!(sku = %change.sku_code, new_minor = change.new_price.amount_minor, "updating price");
            if let Err(e) = self.api.update_price(&change.sku_code, change.new_price).await {
                // Abort the whole loop on the first failure; remaining
                // items are not retried.
                error!(sku = %change.sku_code, "price update failed: {e}");
                self.state = SessionState::GenericError;
                return Ok(CheckoutOutcome::Failed {
                    kind: FailureKind::PriceUpdate,
                    message: "failed to update prices".into(),
                });
            }
        }

        let mut request = self
            .in_flight
            .take()
            .ok_or(CheckoutError::NoPendingPriceChanges)?;
        for change in &changes {
            request.apply_price(&change.sku_code, change.new_price);
        }
        self.submit_request(request).await
    }

    /// User declined the reconciliation prompt. No partial price updates
    /// were committed; the session returns to form entry with shipping
    /// data retained.
    pub fn cancel_price_updates(&mut self) -> CheckoutResult<()> {
        if self.state != SessionState::PriceMismatch {
            return Err(CheckoutError::NoPendingPriceChanges);
        }
        self.pending_changes.clear();
        self.reconcile_rounds = 0;
        self.state = SessionState::FormEntry;
        Ok(())
    }

    async fn submit_request(
        &mut self,
        request: CheckoutRequest,
    ) -> CheckoutResult<CheckoutOutcome> {
        self.state = SessionState::Submitting;
        debug!(items = request.items.len(), "submitting checkout request");

        let response = match self.api.initiate_checkout(&request).await {
            Ok(r) => r,
            Err(e) => {
                error!("checkout initiation failed: {e}");
                self.state = SessionState::GenericError;
                self.in_flight = Some(request);
                return Ok(CheckoutOutcome::Failed {
                    kind: FailureKind::Transport,
                    message: e.to_string(),
                });
            }
        };
        self.in_flight = Some(request);
        self.classify(response).await
    }

    async fn classify(&mut self, response: CheckoutResponse) -> CheckoutResult<CheckoutOutcome> {
        match response.outcome {
            InitiationOutcome::Success => {
                let handoff = match PaymentHandoff::from_response(&response) {
                    Ok(h) => h,
                    Err(e) => {
                        error!("malformed success response: {e}");
                        self.state = SessionState::GenericError;
                        return Ok(CheckoutOutcome::Failed {
                            kind: FailureKind::Transport,
                            message: e.to_string(),
                        });
                    }
                };
                self.state = SessionState::AwaitingPayment;
                self.run_payment(handoff).await
            }
            InitiationOutcome::Failed => {
                let (mismatches, hard) = response.partition_item_errors();
                if !hard.is_empty() {
                    // Hard errors take precedence over price mismatches.
                    let rejected: Vec<ItemError> = hard.into_iter().cloned().collect();
                    warn!(count = rejected.len(), "checkout rejected with item errors");
                    self.state = SessionState::ValidationError;
                    Ok(CheckoutOutcome::ItemsRejected(rejected))
                } else if !mismatches.is_empty() {
                    if self.reconcile_rounds >= self.max_reconcile_rounds {
                        warn!(
                            rounds = self.reconcile_rounds,
                            "prices changed again after reconciliation cap"
                        );
                        self.state = SessionState::GenericError;
                        return Ok(CheckoutOutcome::Failed {
                            kind: FailureKind::PriceStillChanging,
                            message: "prices keep changing; please review your cart".into(),
                        });
                    }
                    let changes = self.build_price_changes(&mismatches);
                    self.pending_changes = changes.clone();
                    self.state = SessionState::PriceMismatch;
                    Ok(CheckoutOutcome::PriceChanges(changes))
                } else {
                    let message = response
                        .failure_reason
                        .unwrap_or_else(|| "checkout failed".into());
                    warn!("checkout failed: {message}");
                    self.state = SessionState::GenericError;
                    Ok(CheckoutOutcome::Failed {
                        kind: FailureKind::Server,
                        message,
                    })
                }
            }
        }
    }

    /// Price changes in item-list order, pairing the client's believed
    /// price with the server-reported current price.
    fn build_price_changes(&self, mismatches: &[&ItemError]) -> Vec<PriceChange> {
        let Some(request) = self.in_flight.as_ref() else {
            return Vec::new();
        };
        let mut changes = Vec::new();
        for item in &request.items {
            let Some(err) = mismatches.iter().find(|e| e.sku_code == item.sku_code) else {
                continue;
            };
            if let Some(current) = err.current_price {
                changes.push(PriceChange {
                    sku_code: item.sku_code.clone(),
                    old_price: item.unit_price,
                    new_price: current,
                });
            }
        }
        changes
    }

    async fn run_payment(&mut self, handoff: PaymentHandoff) -> CheckoutResult<CheckoutOutcome> {
        let prefill = self
            .address
            .as_ref()
            .map(PaymentPrefill::from_address)
            .unwrap_or_default();

        info!(
            order_id = %handoff.gateway_order_id,
            amount_minor = handoff.amount_minor,
            "handing off to payment gateway"
        );
        self.state = SessionState::PaymentPending;

        let outcome = match self.gateway.collect_payment(&handoff, &prefill).await {
            Ok(o) => o,
            Err(e) => {
                error!("gateway session failed: {e}");
                self.state = SessionState::GenericError;
                return Ok(CheckoutOutcome::Failed {
                    kind: FailureKind::Gateway,
                    message: e.to_string(),
                });
            }
        };

        match outcome {
            PaymentOutcome::Completed(confirmation) => {
                self.verify_and_settle(handoff, confirmation).await
            }
            PaymentOutcome::Failed { reason } => {
                // No order reached the point of needing cleanup; the
                // facade is not contacted.
                warn!("gateway reported payment failure: {reason}");
                self.state = SessionState::GenericError;
                Ok(CheckoutOutcome::Failed {
                    kind: FailureKind::Gateway,
                    message: reason,
                })
            }
            PaymentOutcome::Dismissed => {
                // Purely local cancellation. The pre-payment order record
                // is left for the backend's own reaping.
                info!("customer dismissed the gateway overlay");
                self.state = SessionState::CancelledByUser;
                Ok(CheckoutOutcome::Cancelled)
            }
        }
    }

    async fn verify_and_settle(
        &mut self,
        handoff: PaymentHandoff,
        confirmation: PaymentConfirmation,
    ) -> CheckoutResult<CheckoutOutcome> {
        self.state = SessionState::Verifying;

        match self.api.verify_payment(&confirmation).await {
            Ok(result) if result.verified => {
                info!(order_id = %result.order_id, "payment verified");
                self.state = SessionState::Confirmed;
                if matches!(self.selection, Selection::Cart) {
                    // Best effort: a failed clear never downgrades a
                    // confirmed order.
                    if let Err(e) = self.cart.clear().await {
                        warn!("cart clear failed after confirmed order: {e}");
                    }
                }
                Ok(CheckoutOutcome::Confirmed(OrderConfirmation {
                    order_id: result.order_id,
                    payment_id: confirmation.payment_id,
                    amount: result.amount,
                    status: VerificationStatus::Verified,
                    confirmed_at: Utc::now(),
                }))
            }
            Ok(result) => {
                warn!(
                    order_id = %result.order_id,
                    status = %result.status,
                    "server declined to verify payment"
                );
                self.state = SessionState::VerificationSoftFailed;
                Ok(CheckoutOutcome::PendingVerification(OrderConfirmation {
                    order_id: result.order_id,
                    payment_id: confirmation.payment_id,
                    amount: result.amount,
                    status: VerificationStatus::Unverified,
                    confirmed_at: Utc::now(),
                }))
            }
            Err(e) => {
                // Payment is captured from the gateway's perspective;
                // never hide that from the customer. No client retry.
                warn!("verification call failed: {e}");
                self.state = SessionState::VerificationSoftFailed;
                Ok(CheckoutOutcome::PendingVerification(OrderConfirmation {
                    order_id: confirmation.gateway_order_id,
                    payment_id: confirmation.payment_id,
                    amount: Price::from_minor(handoff.amount_minor, handoff.currency),
                    status: VerificationStatus::Unverified,
                    confirmed_at: Utc::now(),
                }))
            }
        }
    }
}
