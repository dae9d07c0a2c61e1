//! Route handlers.

pub mod carts;
pub mod catalog;
pub mod health;
pub mod metrics;
pub mod orders;

use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path segment as a UUID, mapping failure to a 400.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {what}: {raw}")))
}
