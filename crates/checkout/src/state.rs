//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of a checkout in its lifecycle.
///
/// State transitions:
/// ```text
/// Idle ──► Validating ──► Reserved ──► Charging ──► Committing ──► Completed
///              │              │            │             │
///              └──────────────┴────────────┴─────────────┴──► Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// Checkout has not started yet.
    #[default]
    Idle,

    /// Cart contents are being validated against live availability.
    Validating,

    /// Stock is held in the reservation ledger.
    Reserved,

    /// The payment gateway is being charged.
    Charging,

    /// The order and stock decrements are being made durable.
    Committing,

    /// Order placed and stock committed (terminal state).
    Completed,

    /// Checkout failed before completion (terminal state).
    Aborted,
}

impl CheckoutState {
    /// Returns true if checkout can begin validating the cart.
    pub fn can_validate(&self) -> bool {
        matches!(self, CheckoutState::Idle)
    }

    /// Returns true if checkout can reserve stock.
    pub fn can_reserve(&self) -> bool {
        matches!(self, CheckoutState::Validating)
    }

    /// Returns true if checkout can charge the payment gateway.
    pub fn can_charge(&self) -> bool {
        matches!(self, CheckoutState::Reserved)
    }

    /// Returns true if checkout can commit the order and stock.
    pub fn can_commit(&self) -> bool {
        matches!(self, CheckoutState::Charging)
    }

    /// Returns true if checkout can abort from this state.
    pub fn can_abort(&self) -> bool {
        matches!(
            self,
            CheckoutState::Validating
                | CheckoutState::Reserved
                | CheckoutState::Charging
                | CheckoutState::Committing
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Completed | CheckoutState::Aborted)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "Idle",
            CheckoutState::Validating => "Validating",
            CheckoutState::Reserved => "Reserved",
            CheckoutState::Charging => "Charging",
            CheckoutState::Committing => "Committing",
            CheckoutState::Completed => "Completed",
            CheckoutState::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
