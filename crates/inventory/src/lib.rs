//! Inventory reservation for the storefront order pipeline.
//!
//! The [`ReservationLedger`] tracks in-flight holds per item in a
//! lock-guarded map; admission is all-or-nothing and runs entirely inside
//! one lock acquisition. [`InventoryService`] layers catalog access on top:
//! it answers availability questions with holds subtracted, admits and
//! releases reservations, and turns reservations into durable stock
//! decrements at commit time.

pub mod error;
pub mod ledger;
pub mod service;

pub use error::{InventoryError, Result};
pub use ledger::{ReservationLedger, ReservationLine};
pub use service::{InventoryService, ItemAvailability};
