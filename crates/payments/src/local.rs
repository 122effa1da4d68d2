//! In-process gateway for development and tests.
//!
//! Mirrors the sandbox's test-nonce behaviour closely enough for end-to-end
//! runs without network access. Callbacks run inline on the calling task.

use serde_json::json;
use uuid::Uuid;

use crate::gateway::{
    ClientTokenRequest, ClientTokenResponse, GatewayCallback, GatewayClient, GatewayError,
    SaleReceipt, SaleRequest,
};

/// Nonce the sandbox uses to simulate a processor decline.
pub const DECLINED_NONCE: &str = "fake-processor-declined-visa-nonce";

#[derive(Debug, Clone, Default)]
pub struct LocalGatewayClient;

impl LocalGatewayClient {
    pub fn new() -> Self {
        Self
    }

    fn settle(&self, request: &SaleRequest) -> Result<SaleReceipt, GatewayError> {
        if request.payment_method_nonce.trim().is_empty() {
            return Err(GatewayError::new(
                "validationError",
                "Payment method nonce is required",
            ));
        }
        if !(request.amount > 0.0) {
            return Err(GatewayError::new(
                "validationError",
                "Amount must be greater than zero",
            ));
        }
        if request.payment_method_nonce == DECLINED_NONCE {
            return Err(GatewayError::new("processorDeclined", "Do Not Honor")
                .with_details(json!({ "processorResponseCode": "2000" })));
        }

        let status = if request.options.submit_for_settlement {
            "submitted_for_settlement"
        } else {
            "authorized"
        };
        Ok(SaleReceipt(json!({
            "success": true,
            "transaction": {
                "id": format!("local_{}", Uuid::now_v7().simple()),
                "status": status,
                "amount": format!("{:.2}", request.amount),
            }
        })))
    }
}

impl GatewayClient for LocalGatewayClient {
    fn generate_client_token(
        &self,
        _request: ClientTokenRequest,
        callback: GatewayCallback<ClientTokenResponse>,
    ) -> Result<(), GatewayError> {
        callback(Ok(ClientTokenResponse {
            client_token: format!("local-{}", Uuid::now_v7()),
        }));
        Ok(())
    }

    fn sale(
        &self,
        request: SaleRequest,
        callback: GatewayCallback<SaleReceipt>,
    ) -> Result<(), GatewayError> {
        tracing::debug!(amount = request.amount, "local gateway sale");
        callback(self.settle(&request));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn capture<T: Send + 'static>() -> (GatewayCallback<T>, Arc<Mutex<Option<Result<T, GatewayError>>>>) {
        let slot = Arc::new(Mutex::new(None));
        let sink = slot.clone();
        let callback: GatewayCallback<T> = Box::new(move |result| {
            *sink.lock().unwrap() = Some(result);
        });
        (callback, slot)
    }

    #[test]
    fn issues_prefixed_client_tokens() {
        let (callback, slot) = capture();
        LocalGatewayClient::new()
            .generate_client_token(ClientTokenRequest::default(), callback)
            .unwrap();
        let token = slot.lock().unwrap().take().unwrap().unwrap();
        assert!(token.client_token.starts_with("local-"));
    }

    #[test]
    fn settles_valid_sale() {
        let (callback, slot) = capture();
        LocalGatewayClient::new()
            .sale(SaleRequest::settle(30.0, "fake-valid-nonce"), callback)
            .unwrap();
        let receipt = slot.lock().unwrap().take().unwrap().unwrap();
        assert_eq!(receipt.0["success"], true);
        assert_eq!(receipt.0["transaction"]["amount"], "30.00");
        assert_eq!(receipt.0["transaction"]["status"], "submitted_for_settlement");
        assert!(receipt.transaction_id().unwrap().starts_with("local_"));
    }

    #[test]
    fn declines_the_decline_nonce() {
        let (callback, slot) = capture();
        LocalGatewayClient::new()
            .sale(SaleRequest::settle(10.0, DECLINED_NONCE), callback)
            .unwrap();
        let err = slot.lock().unwrap().take().unwrap().unwrap_err();
        assert_eq!(err.name, "processorDeclined");
        assert_eq!(err.message, "Do Not Honor");
    }

    #[test]
    fn rejects_blank_nonce_and_non_positive_amount() {
        let client = LocalGatewayClient::new();
        for request in [SaleRequest::settle(10.0, "  "), SaleRequest::settle(0.0, "nonce")] {
            let (callback, slot) = capture();
            client.sale(request, callback).unwrap();
            let err = slot.lock().unwrap().take().unwrap().unwrap_err();
            assert_eq!(err.name, "validationError");
        }
    }
}
