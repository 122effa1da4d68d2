//! Response envelopes. Every failure in this API is a 500 except the auth
//! guards, which answer 401; existing clients depend on that.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use vault_infra::services::{CheckoutError, ProductMutationError};
use vault_payments::{GatewayError, PaymentError};

pub const CREATE_FAILED: &str = "Error in crearing product";
pub const UPDATE_FAILED: &str = "Error in Updte product";
pub const DELETE_FAILED: &str = "Error while deleting product";
pub const SINGLE_FETCH_FAILED: &str = "Eror while getitng single product";
pub const PHOTO_FETCH_FAILED: &str = "Erorr while getting photo";
pub const LIST_FAILED: &str = "Erorr in getting products";

pub fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, axum::Json(body)).into_response()
}

/// `401 {success:false, message}`.
pub fn auth_failure(message: &'static str) -> Response {
    json_response(
        StatusCode::UNAUTHORIZED,
        json!({ "success": false, "message": message }),
    )
}

/// Product operation failure.
///
/// Input validation renders as `{error: <message>}`; anything else renders
/// the operation's fixed message plus the error text.
pub fn product_failure(failure_message: &'static str, err: &ProductMutationError) -> Response {
    match err {
        ProductMutationError::Validation(v) => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": v.to_string() }),
        ),
        other => operation_failure(failure_message, other.to_string()),
    }
}

/// `500 {success:false, message, error}`.
pub fn operation_failure(message: &'static str, error: impl Into<String>) -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false, "message": message, "error": error.into() }),
    )
}

/// Gateway failures go back as the gateway's own error object.
pub fn payment_failure(err: &PaymentError) -> Response {
    raw_gateway_error(&err.raw())
}

pub fn checkout_failure(err: &CheckoutError) -> Response {
    match err {
        CheckoutError::Payment(e) => payment_failure(e),
        CheckoutError::Persist { source, receipt } => raw_gateway_error(
            &GatewayError::new("orderPersistenceError", source.to_string())
                .with_details(receipt.0.clone()),
        ),
        CheckoutError::Interrupted(message) => {
            raw_gateway_error(&GatewayError::new("checkoutInterrupted", message.clone()))
        }
    }
}

pub fn raw_gateway_error(err: &GatewayError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(err)).into_response()
}
