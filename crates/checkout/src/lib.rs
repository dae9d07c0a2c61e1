//! Checkout orchestration.
//!
//! Turns a cart into a placed order: validate the cart against live
//! availability, reserve stock, charge the payment gateway, persist the
//! order, and commit the reservation into durable stock. Reservation
//! release is the only compensating action; every failure after a
//! successful reserve releases the holds, except a partial stock commit,
//! which deliberately leaves the uncommitted holds in place for
//! reconciliation.

pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod state;

pub use error::{CheckoutError, Result};
pub use gateway::{
    ChargeOutcome, ChargeRequest, GatewayError, InMemoryPaymentGateway, PaymentGateway,
};
pub use orchestrator::{
    AMOUNT_TOLERANCE_CENTS, CheckoutOrchestrator, CheckoutReceipt, CheckoutRequest,
};
pub use state::CheckoutState;
