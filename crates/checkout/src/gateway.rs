//! Payment gateway trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, PaymentId};
use thiserror::Error;

/// A charge submitted to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Amount to charge.
    pub amount: Money,

    /// ISO currency code, e.g. "USD".
    pub currency: String,

    /// Opaque payment method token supplied by the customer.
    pub payment_method: String,
}

/// The gateway's decision on a charge.
///
/// A decline is a normal business outcome, not a transport failure, so it
/// arrives inside `Ok`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// The charge went through.
    Succeeded {
        /// Gateway-assigned payment reference.
        payment_id: PaymentId,
    },

    /// The gateway refused the charge.
    Declined {
        /// Gateway-reported reason.
        reason: String,
    },
}

/// Transport-level gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be reached or timed out.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a charge and returns the gateway's decision.
    async fn charge(
        &self,
        request: ChargeRequest,
    ) -> std::result::Result<ChargeOutcome, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    charges: Vec<(PaymentId, ChargeRequest)>,
    next_id: u32,
    decline_reason: Option<String>,
    fail_on_charge: bool,
}

/// In-memory payment gateway for tests and the default server wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every charge to be declined with the given reason.
    pub fn set_decline(&self, reason: impl Into<String>) {
        self.state.write().unwrap().decline_reason = Some(reason.into());
    }

    /// Configures every charge to fail at the transport level.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Returns the number of successful charges captured.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Returns true if a successful charge exists with the given ID.
    pub fn has_payment(&self, payment_id: &PaymentId) -> bool {
        self.state
            .read()
            .unwrap()
            .charges
            .iter()
            .any(|(id, _)| id == payment_id)
    }

    /// Returns the most recent successful charge, if any.
    pub fn last_charge(&self) -> Option<ChargeRequest> {
        self.state
            .read()
            .unwrap()
            .charges
            .last()
            .map(|(_, request)| request.clone())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(
        &self,
        request: ChargeRequest,
    ) -> std::result::Result<ChargeOutcome, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_charge {
            return Err(GatewayError::Unavailable(
                "injected transport failure".into(),
            ));
        }

        if let Some(reason) = &state.decline_reason {
            return Ok(ChargeOutcome::Declined {
                reason: reason.clone(),
            });
        }

        state.next_id += 1;
        let payment_id = PaymentId::new(format!("PAY-{:04}", state.next_id));
        state.charges.push((payment_id.clone(), request));

        Ok(ChargeOutcome::Succeeded { payment_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cents: i64) -> ChargeRequest {
        ChargeRequest {
            amount: Money::from_cents(cents),
            currency: "USD".to_string(),
            payment_method: "card".to_string(),
        }
    }

    #[tokio::test]
    async fn charge_captures_payment() {
        let gateway = InMemoryPaymentGateway::new();

        let outcome = gateway.charge(request(5000)).await.unwrap();
        let payment_id = match outcome {
            ChargeOutcome::Succeeded { payment_id } => payment_id,
            other => panic!("expected success, got {other:?}"),
        };

        assert_eq!(gateway.charge_count(), 1);
        assert!(gateway.has_payment(&payment_id));
        assert_eq!(gateway.last_charge(), Some(request(5000)));
    }

    #[tokio::test]
    async fn sequential_payment_ids() {
        let gateway = InMemoryPaymentGateway::new();

        let first = gateway.charge(request(1000)).await.unwrap();
        let second = gateway.charge(request(1000)).await.unwrap();

        assert_eq!(
            first,
            ChargeOutcome::Succeeded {
                payment_id: PaymentId::new("PAY-0001")
            }
        );
        assert_eq!(
            second,
            ChargeOutcome::Succeeded {
                payment_id: PaymentId::new("PAY-0002")
            }
        );
    }

    #[tokio::test]
    async fn decline_is_an_ok_outcome() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_decline("card declined");

        let outcome = gateway.charge(request(5000)).await.unwrap();
        assert_eq!(
            outcome,
            ChargeOutcome::Declined {
                reason: "card declined".to_string()
            }
        );
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_charge(true);

        let result = gateway.charge(request(5000)).await;
        assert!(matches!(result, Err(GatewayError::Unavailable(_))));
        assert_eq!(gateway.charge_count(), 0);
    }
}
