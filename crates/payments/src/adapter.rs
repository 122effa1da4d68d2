//! Awaitable facade over a callback-style [`GatewayClient`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::instrument;

use crate::braintree::BraintreeClient;
use crate::config::{GatewayConfig, GatewayEnvironment};
use crate::gateway::{
    ClientTokenRequest, ClientTokenResponse, GatewayCallback, GatewayClient, GatewayError,
    SaleReceipt, SaleRequest,
};
use crate::local::LocalGatewayClient;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The gateway answered through the callback with an error.
    #[error("gateway rejected the request: {0}")]
    Rejected(GatewayError),

    /// The gateway call failed before a callback could be scheduled.
    #[error("gateway call failed: {0}")]
    Invocation(GatewayError),

    /// The callback was dropped without ever being invoked.
    #[error("gateway dropped the callback without a result")]
    CallbackDropped,
}

impl PaymentError {
    /// Error object to hand back to the client untouched.
    pub fn raw(&self) -> GatewayError {
        match self {
            PaymentError::Rejected(e) | PaymentError::Invocation(e) => e.clone(),
            PaymentError::CallbackDropped => GatewayError::new(
                "callbackDropped",
                "gateway dropped the callback without a result",
            ),
        }
    }

    /// Short tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::Rejected(_) => "rejected",
            PaymentError::Invocation(_) => "invocation",
            PaymentError::CallbackDropped => "callback_dropped",
        }
    }
}

#[derive(Clone)]
pub struct PaymentGatewayAdapter {
    client: Arc<dyn GatewayClient>,
    environment: GatewayEnvironment,
}

impl core::fmt::Debug for PaymentGatewayAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaymentGatewayAdapter")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl PaymentGatewayAdapter {
    /// Wrap an already-built client (tests inject fakes here).
    pub fn new(client: Arc<dyn GatewayClient>, environment: GatewayEnvironment) -> Self {
        Self {
            client,
            environment,
        }
    }

    /// Build the client the configuration asks for.
    pub fn from_config(config: GatewayConfig) -> Result<Self, PaymentError> {
        let environment = config.environment;
        let client: Arc<dyn GatewayClient> = match environment {
            GatewayEnvironment::Local => Arc::new(LocalGatewayClient::new()),
            GatewayEnvironment::Sandbox | GatewayEnvironment::Production => {
                Arc::new(BraintreeClient::new(config).map_err(PaymentError::Invocation)?)
            }
        };
        Ok(Self::new(client, environment))
    }

    pub fn environment(&self) -> GatewayEnvironment {
        self.environment
    }

    #[instrument(skip(self), fields(environment = self.environment.as_str()))]
    pub async fn issue_client_token(&self) -> Result<ClientTokenResponse, PaymentError> {
        let client = self.client.clone();
        bridge("client_token", move |callback| {
            client.generate_client_token(ClientTokenRequest::default(), callback)
        })
        .await
    }

    /// Submit a sale for `amount` and settle it.
    #[instrument(skip(self, nonce), fields(environment = self.environment.as_str()))]
    pub async fn charge(&self, amount: f64, nonce: &str) -> Result<SaleReceipt, PaymentError> {
        let client = self.client.clone();
        let request = SaleRequest::settle(amount, nonce);
        bridge("sale", move |callback| client.sale(request, callback)).await
    }
}

/// Run one callback-style call and wait for its single completion.
async fn bridge<T, F>(operation: &'static str, invoke: F) -> Result<T, PaymentError>
where
    T: Send + 'static,
    F: FnOnce(GatewayCallback<T>) -> Result<(), GatewayError>,
{
    let (tx, rx) = oneshot::channel();
    let callback: GatewayCallback<T> = Box::new(move |result| {
        // Receiver is gone only if the request future was dropped.
        if let Err(result) = tx.send(result) {
            tracing::error!(
                operation,
                succeeded = result.is_ok(),
                "gateway answered after the caller went away; result discarded"
            );
        }
    });

    if let Err(err) = invoke(callback) {
        tracing::error!(operation, error = %err, "gateway call failed");
        return Err(PaymentError::Invocation(err));
    }

    match rx.await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::warn!(operation, error = %err, "gateway returned an error");
            Err(PaymentError::Rejected(err))
        }
        Err(_) => {
            tracing::error!(operation, "gateway callback dropped");
            Err(PaymentError::CallbackDropped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted gateway: what to do on each call.
    enum Script {
        Succeed,
        CallbackError(GatewayError),
        Throw(GatewayError),
        Drop,
        Deferred,
    }

    struct FakeGateway {
        script: Script,
        sales: Mutex<Vec<SaleRequest>>,
    }

    impl FakeGateway {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                sales: Mutex::new(Vec::new()),
            })
        }

        fn finish<T: Send + 'static>(&self, ok: T, callback: GatewayCallback<T>) -> Result<(), GatewayError> {
            match &self.script {
                Script::Succeed => {
                    callback(Ok(ok));
                    Ok(())
                }
                Script::CallbackError(e) => {
                    callback(Err(e.clone()));
                    Ok(())
                }
                Script::Throw(e) => Err(e.clone()),
                Script::Drop => {
                    drop(callback);
                    Ok(())
                }
                Script::Deferred => {
                    tokio::spawn(async move {
                        tokio::task::yield_now().await;
                        callback(Ok(ok));
                    });
                    Ok(())
                }
            }
        }
    }

    impl GatewayClient for FakeGateway {
        fn generate_client_token(
            &self,
            _request: ClientTokenRequest,
            callback: GatewayCallback<ClientTokenResponse>,
        ) -> Result<(), GatewayError> {
            let token = ClientTokenResponse {
                client_token: "fake-client-token".to_string(),
            };
            self.finish(token, callback)
        }

        fn sale(
            &self,
            request: SaleRequest,
            callback: GatewayCallback<SaleReceipt>,
        ) -> Result<(), GatewayError> {
            self.sales.lock().unwrap().push(request);
            self.finish(SaleReceipt(json!({ "success": true })), callback)
        }
    }

    fn adapter(gateway: Arc<FakeGateway>) -> PaymentGatewayAdapter {
        PaymentGatewayAdapter::new(gateway, GatewayEnvironment::Local)
    }

    #[tokio::test]
    async fn token_resolves_on_callback_success() {
        let token = adapter(FakeGateway::new(Script::Succeed))
            .issue_client_token()
            .await
            .unwrap();
        assert_eq!(token.client_token, "fake-client-token");
    }

    #[tokio::test]
    async fn token_callback_error_is_surfaced_untouched() {
        let err = GatewayError::new("authenticationError", "Error generating token");
        let result = adapter(FakeGateway::new(Script::CallbackError(err.clone())))
            .issue_client_token()
            .await;
        match result {
            Err(PaymentError::Rejected(raw)) => assert_eq!(raw, err),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn thrown_error_becomes_invocation_failure() {
        let err = GatewayError::new("Error", "Test error");
        let result = adapter(FakeGateway::new(Script::Throw(err.clone())))
            .issue_client_token()
            .await;
        match result {
            Err(e @ PaymentError::Invocation(_)) => assert_eq!(e.raw(), err),
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_callback_does_not_hang() {
        let result = adapter(FakeGateway::new(Script::Drop))
            .charge(10.0, "nonce")
            .await;
        assert!(matches!(result, Err(PaymentError::CallbackDropped)));
    }

    #[tokio::test]
    async fn charge_submits_settling_sale() {
        let gateway = FakeGateway::new(Script::Succeed);
        let receipt = adapter(gateway.clone()).charge(30.0, "nonce").await.unwrap();
        assert_eq!(receipt.0["success"], true);

        let sales = gateway.sales.lock().unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0], SaleRequest::settle(30.0, "nonce"));
        assert!(sales[0].options.submit_for_settlement);
    }

    #[tokio::test]
    async fn charge_waits_for_deferred_callback() {
        let receipt = adapter(FakeGateway::new(Script::Deferred))
            .charge(5.0, "nonce")
            .await
            .unwrap();
        assert_eq!(receipt.0["success"], true);
    }

    #[test]
    fn from_config_rejects_blank_remote_credentials() {
        let mut config = GatewayConfig::local();
        config.environment = GatewayEnvironment::Sandbox;
        let err = PaymentGatewayAdapter::from_config(config).unwrap_err();
        assert_eq!(err.kind(), "invocation");
    }
}
