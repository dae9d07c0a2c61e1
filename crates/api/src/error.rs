//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Cart operation rejected.
    Cart(CartError),
    /// Checkout pipeline failure.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CartError::ItemUnavailable(_) | CartError::ItemNotInCart(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CartError::InsufficientInventory { .. } => (StatusCode::CONFLICT, err.to_string()),
        CartError::Inventory(_) => {
            tracing::error!(error = %err, "cart operation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::EmptyCart | CheckoutError::AmountMismatch { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        CheckoutError::ItemUnavailable(_)
        | CheckoutError::InsufficientInventory { .. }
        | CheckoutError::ReservationFailed { .. } => (StatusCode::CONFLICT, err.to_string()),
        CheckoutError::PaymentFailed(_) => (StatusCode::PAYMENT_REQUIRED, err.to_string()),
        CheckoutError::CommitIncomplete { .. } => {
            tracing::error!(error = %err, "checkout left partial state");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        CheckoutError::Persistence(_) | CheckoutError::Unexpected(_) => {
            tracing::error!(error = %err, "checkout failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
