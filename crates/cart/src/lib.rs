//! Shopping cart for the storefront order pipeline.
//!
//! A [`Cart`] is a per-customer map of item lines. Adding a line checks the
//! inventory service's availability view up front; pricing lives in
//! [`Cart::summary`], which applies the fixed tax rate in integer cents.

pub mod cart;
pub mod error;

pub use cart::{Cart, CartLine, CartSummary, TAX_RATE_BASIS_POINTS};
pub use error::{CartError, Result};
