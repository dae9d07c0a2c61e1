//! Shared types used across the storefront order pipeline.
//!
//! Identifier newtypes keep catalog items, carts, orders, and payments from
//! being mixed up at compile time, and [`Money`] carries every amount in
//! integer cents so pricing math stays exact.

pub mod ids;
pub mod money;

pub use ids::{CartId, ItemId, OrderId, PaymentId, UserId};
pub use money::{Money, MoneyParseError};
