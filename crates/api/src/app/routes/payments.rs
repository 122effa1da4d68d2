use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use vault_payments::GatewayError;

use crate::app::dto::PaymentRequest;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::RequesterContext;

pub async fn client_token(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.checkout.client_token().await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => errors::payment_failure(&e),
    }
}

pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "malformed payment request");
            return errors::raw_gateway_error(&GatewayError::new(
                "invalidRequest",
                rejection.body_text(),
            ));
        }
    };

    match services
        .checkout
        .checkout(&request.nonce, request.cart, requester.user_id())
        .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(e) => errors::checkout_failure(&e),
    }
}
