//! Order persistence.
//!
//! A placed order is an immutable record of what checkout charged: the
//! priced lines, the totals, and the payment reference. This crate holds the
//! [`Order`] model, the [`OrderStore`] trait, and its in-memory and
//! PostgreSQL implementations.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use model::{Order, OrderLine};
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
