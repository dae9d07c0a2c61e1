//! Checkout orchestrator.

use cart::{Cart, CartError};
use catalog::CatalogStore;
use common::{Money, OrderId, PaymentId};
use inventory::{InventoryError, InventoryService};
use orders::{Order, OrderLine, OrderStore};
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};
use crate::gateway::{ChargeOutcome, ChargeRequest, PaymentGateway};
use crate::state::CheckoutState;

/// Allowed gap between the submitted amount and the recomputed cart total.
pub const AMOUNT_TOLERANCE_CENTS: i64 = 1;

/// Payment details submitted when checking out a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Opaque payment method token supplied by the customer.
    pub payment_method: String,

    /// Amount the customer expects to pay. Must match the recomputed cart
    /// total within [`AMOUNT_TOLERANCE_CENTS`].
    pub amount: Money,

    /// ISO currency code, e.g. "USD".
    pub currency: String,
}

/// Proof of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    /// The placed order.
    pub order_id: OrderId,

    /// The gateway's payment reference.
    pub payment_id: PaymentId,

    /// Amount actually charged.
    pub total: Money,
}

/// Orchestrates the checkout pipeline.
///
/// The pipeline is validate → reserve → charge → persist → commit, walking
/// [`CheckoutState`] linearly. Stock is only ever held in the reservation
/// ledger until both the charge and the order write have succeeded; the
/// single compensating action is releasing those holds. The one exception
/// is a partial stock commit, where the uncommitted holds deliberately stay
/// in the ledger and the caller gets [`CheckoutError::CommitIncomplete`].
pub struct CheckoutOrchestrator<C, P, O>
where
    C: CatalogStore,
    P: PaymentGateway,
    O: OrderStore,
{
    inventory: InventoryService<C>,
    gateway: P,
    orders: O,
}

impl<C, P, O> CheckoutOrchestrator<C, P, O>
where
    C: CatalogStore,
    P: PaymentGateway,
    O: OrderStore,
{
    /// Creates a new checkout orchestrator.
    pub fn new(inventory: InventoryService<C>, gateway: P, orders: O) -> Self {
        Self {
            inventory,
            gateway,
            orders,
        }
    }

    /// Gets a reference to the inventory service.
    pub fn inventory(&self) -> &InventoryService<C> {
        &self.inventory
    }

    /// Gets a reference to the payment gateway.
    pub fn gateway(&self) -> &P {
        &self.gateway
    }

    /// Gets a reference to the order store.
    pub fn orders(&self) -> &O {
        &self.orders
    }

    /// Executes a checkout for the given cart.
    ///
    /// On success the cart is emptied and a receipt is returned. On failure
    /// the cart keeps its lines so the customer can retry.
    #[tracing::instrument(
        skip(self, cart, request),
        fields(user_id = %cart.user_id(), line_count = cart.len())
    )]
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_executions_total").increment(1);
        let checkout_start = std::time::Instant::now();

        let outcome = self.run(cart, &request).await;

        metrics::histogram!("checkout_duration_seconds")
            .record(checkout_start.elapsed().as_secs_f64());
        match &outcome {
            Ok(receipt) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(
                    order_id = %receipt.order_id,
                    payment_id = %receipt.payment_id,
                    total = %receipt.total,
                    "checkout completed"
                );
            }
            Err(_) => {
                metrics::counter!("checkout_failed").increment(1);
            }
        }
        outcome
    }

    async fn run(&self, cart: &mut Cart, request: &CheckoutRequest) -> Result<CheckoutReceipt> {
        let mut state = CheckoutState::Idle;

        // 1. Validate the cart against live availability
        Self::advance(&mut state, CheckoutState::Validating);
        if cart.is_empty() {
            return Err(Self::abort(&mut state, CheckoutError::EmptyCart));
        }
        if let Err(e) = cart.refresh_lines(&self.inventory).await {
            return Err(Self::abort(&mut state, map_validation_error(e)));
        }

        // 2. Reserve stock in the ledger
        let lines = cart.reservation_lines();
        if let Err(e) = self.inventory.reserve(&lines).await {
            return Err(Self::abort(&mut state, map_reserve_error(e)));
        }
        Self::advance(&mut state, CheckoutState::Reserved);

        // 3. Price the cart and check the submitted amount against it
        let summary = cart.summary();
        if summary.total.abs_diff(request.amount) > AMOUNT_TOLERANCE_CENTS {
            self.inventory.release(&lines);
            return Err(Self::abort(
                &mut state,
                CheckoutError::AmountMismatch {
                    expected: summary.total,
                    provided: request.amount,
                },
            ));
        }

        // 4. Charge the gateway for the recomputed total
        Self::advance(&mut state, CheckoutState::Charging);
        let charge = ChargeRequest {
            amount: summary.total,
            currency: request.currency.clone(),
            payment_method: request.payment_method.clone(),
        };
        let payment_id = match self.gateway.charge(charge).await {
            Ok(ChargeOutcome::Succeeded { payment_id }) => payment_id,
            Ok(ChargeOutcome::Declined { reason }) => {
                self.inventory.release(&lines);
                return Err(Self::abort(&mut state, CheckoutError::PaymentFailed(reason)));
            }
            Err(e) => {
                self.inventory.release(&lines);
                return Err(Self::abort(
                    &mut state,
                    CheckoutError::PaymentFailed(e.to_string()),
                ));
            }
        };

        // 5. Persist the order, then turn the holds into stock decrements
        Self::advance(&mut state, CheckoutState::Committing);
        let order_lines = summary
            .lines
            .iter()
            .map(|line| {
                OrderLine::new(
                    line.item_id.clone(),
                    line.name.clone(),
                    line.unit_price,
                    line.quantity,
                )
            })
            .collect();
        let order = Order::new(
            cart.user_id(),
            payment_id,
            order_lines,
            summary.subtotal,
            summary.tax,
            summary.total,
        );
        let receipt = CheckoutReceipt {
            order_id: order.order_id,
            payment_id: order.payment_id.clone(),
            total: order.total,
        };

        if let Err(e) = self.orders.create(order).await {
            self.inventory.release(&lines);
            return Err(Self::abort(
                &mut state,
                CheckoutError::Persistence(e.to_string()),
            ));
        }

        if let Err(e) = self.inventory.commit(&lines).await {
            // Payment is taken and the order is durable. The holds of the
            // uncommitted lines stay in the ledger for reconciliation, so
            // no release here.
            return Err(Self::abort(
                &mut state,
                CheckoutError::CommitIncomplete {
                    order_id: receipt.order_id,
                    source: e,
                },
            ));
        }

        cart.clear();
        Self::advance(&mut state, CheckoutState::Completed);
        Ok(receipt)
    }

    fn advance(state: &mut CheckoutState, next: CheckoutState) {
        tracing::debug!(from = %state, to = %next, "checkout state advanced");
        *state = next;
    }

    fn abort(state: &mut CheckoutState, error: CheckoutError) -> CheckoutError {
        tracing::warn!(from = %state, %error, "checkout aborted");
        *state = CheckoutState::Aborted;
        error
    }
}

fn map_validation_error(error: CartError) -> CheckoutError {
    match error {
        CartError::ItemUnavailable(item_id) => CheckoutError::ItemUnavailable(item_id),
        CartError::InsufficientInventory {
            item_id,
            requested,
            available,
        } => CheckoutError::InsufficientInventory {
            item_id,
            requested,
            available,
        },
        CartError::Inventory(e) => CheckoutError::Persistence(e.to_string()),
        other => CheckoutError::Unexpected(other.to_string()),
    }
}

fn map_reserve_error(error: InventoryError) -> CheckoutError {
    match error {
        InventoryError::ItemUnavailable(item_id) => CheckoutError::ItemUnavailable(item_id),
        InventoryError::InsufficientStock {
            item_id,
            requested,
            available,
        } => CheckoutError::ReservationFailed {
            item_id,
            requested,
            available,
        },
        InventoryError::Catalog(e) => CheckoutError::Persistence(e.to_string()),
        other => CheckoutError::Unexpected(other.to_string()),
    }
}
