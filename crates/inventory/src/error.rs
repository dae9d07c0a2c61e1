use catalog::CatalogError;
use common::ItemId;
use thiserror::Error;

use crate::ledger::ReservationLine;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The catalog has no item with this ID.
    #[error("Item unavailable: {0}")]
    ItemUnavailable(ItemId),

    /// Admitting the reservation would exceed an item's stock total.
    #[error("Insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// A commit stopped partway through its lines.
    ///
    /// The `committed` lines are durably decremented and their holds are
    /// gone; the `still_held` lines (starting with `failed_item`) keep
    /// their ledger holds so the discrepancy stays visible for
    /// reconciliation.
    #[error(
        "Commit incomplete: {} of {} lines durable, stopped at {failed_item}",
        .committed.len(),
        .committed.len() + .still_held.len()
    )]
    CommitIncomplete {
        committed: Vec<ReservationLine>,
        still_held: Vec<ReservationLine>,
        failed_item: ItemId,
        #[source]
        source: CatalogError,
    },

    /// Catalog store error.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
