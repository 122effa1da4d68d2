//! Callback-style gateway contract (the shape of the vendor SDK).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Error object reported by the gateway.
///
/// Serialized as-is into failure responses, so its fields are the wire shape.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct GatewayError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl GatewayError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }
}

/// Completion callback handed to the gateway. Invoked at most once.
pub type GatewayCallback<T> = Box<dyn FnOnce(Result<T, GatewayError>) + Send + 'static>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenResponse {
    pub client_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOptions {
    pub submit_for_settlement: bool,
}

/// Sale submission: `{amount, paymentMethodNonce, options: {submitForSettlement}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub amount: f64,
    pub payment_method_nonce: String,
    pub options: SaleOptions,
}

impl SaleRequest {
    /// Sale that settles immediately.
    pub fn settle(amount: f64, nonce: impl Into<String>) -> Self {
        Self {
            amount,
            payment_method_nonce: nonce.into(),
            options: SaleOptions {
                submit_for_settlement: true,
            },
        }
    }
}

/// Gateway result of an accepted sale. Opaque to this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleReceipt(pub JsonValue);

impl SaleReceipt {
    pub fn transaction_id(&self) -> Option<&str> {
        self.0
            .pointer("/transaction/id")
            .and_then(JsonValue::as_str)
    }
}

/// Gateway operations in SDK shape.
///
/// `Err` returned directly means the call could not even be dispatched
/// (bad configuration, no runtime). Otherwise the outcome arrives through
/// `callback`, possibly on another task.
pub trait GatewayClient: Send + Sync {
    fn generate_client_token(
        &self,
        request: ClientTokenRequest,
        callback: GatewayCallback<ClientTokenResponse>,
    ) -> Result<(), GatewayError>;

    fn sale(
        &self,
        request: SaleRequest,
        callback: GatewayCallback<SaleReceipt>,
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sale_request_uses_sdk_field_names() {
        let request = SaleRequest::settle(30.0, "nonce");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "amount": 30.0,
                "paymentMethodNonce": "nonce",
                "options": { "submitForSettlement": true }
            })
        );
    }

    #[test]
    fn receipt_exposes_transaction_id() {
        let receipt = SaleReceipt(json!({ "success": true, "transaction": { "id": "txn_9" } }));
        assert_eq!(receipt.transaction_id(), Some("txn_9"));
    }

    #[test]
    fn error_serializes_without_empty_details() {
        let err = GatewayError::new("processorDeclined", "Do Not Honor");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "name": "processorDeclined", "message": "Do Not Honor" })
        );
    }
}
