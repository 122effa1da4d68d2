//! Braintree GraphQL client in callback form.
//!
//! Each call spawns one request task on the current tokio runtime and reports
//! through the callback when the response (or transport error) arrives.

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};

use crate::config::{GatewayConfig, GatewayEnvironment};
use crate::gateway::{
    ClientTokenRequest, ClientTokenResponse, GatewayCallback, GatewayClient, GatewayError,
    SaleReceipt, SaleRequest,
};

const SANDBOX_ENDPOINT: &str = "https://payments.sandbox.braintree-api.com/graphql";
const PRODUCTION_ENDPOINT: &str = "https://payments.braintree-api.com/graphql";
const API_VERSION: &str = "2019-01-01";

const CLIENT_TOKEN_MUTATION: &str = r#"
mutation ClientToken($input: CreateClientTokenInput) {
  createClientToken(input: $input) { clientToken }
}"#;

const CHARGE_MUTATION: &str = r#"
mutation Charge($input: ChargePaymentMethodInput!) {
  chargePaymentMethod(input: $input) {
    transaction { id status createdAt amount { value currencyCode } }
  }
}"#;

const AUTHORIZE_MUTATION: &str = r#"
mutation Authorize($input: AuthorizePaymentMethodInput!) {
  authorizePaymentMethod(input: $input) {
    transaction { id status createdAt amount { value currencyCode } }
  }
}"#;

#[derive(Clone, Debug)]
pub struct BraintreeClient {
    http: reqwest::Client,
    endpoint: &'static str,
    config: Arc<GatewayConfig>,
}

impl BraintreeClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let endpoint = match config.environment {
            GatewayEnvironment::Sandbox => SANDBOX_ENDPOINT,
            GatewayEnvironment::Production => PRODUCTION_ENDPOINT,
            GatewayEnvironment::Local => {
                return Err(GatewayError::new(
                    "configurationError",
                    "the local environment has no remote endpoint",
                ));
            }
        };

        let missing = config.missing_credentials();
        if !missing.is_empty() {
            return Err(GatewayError::new(
                "authenticationError",
                format!("missing gateway credentials: {}", missing.join(", ")),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::new("configurationError", e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            config: Arc::new(config),
        })
    }

    async fn post(&self, query: &str, variables: JsonValue) -> Result<JsonValue, GatewayError> {
        let response = self
            .http
            .post(self.endpoint)
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .header("Braintree-Version", API_VERSION)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| GatewayError::new("networkError", e.to_string()))?;

        let status = response.status();
        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| GatewayError::new("unexpectedError", e.to_string()))?;

        if let Some(err) = graphql_error(&body) {
            return Err(err);
        }
        if !status.is_success() {
            return Err(GatewayError::new(
                "unexpectedError",
                format!("gateway responded with HTTP {status}"),
            )
            .with_details(body));
        }
        Ok(body)
    }

    async fn fetch_client_token(self, input: JsonValue) -> Result<ClientTokenResponse, GatewayError> {
        let body = self
            .post(CLIENT_TOKEN_MUTATION, json!({ "input": input }))
            .await?;
        let token = body
            .pointer("/data/createClientToken/clientToken")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                GatewayError::new("unexpectedError", "response carried no client token")
                    .with_details(body.clone())
            })?;
        Ok(ClientTokenResponse {
            client_token: token.to_string(),
        })
    }

    async fn submit_sale(
        self,
        query: &'static str,
        field: &'static str,
        variables: JsonValue,
    ) -> Result<SaleReceipt, GatewayError> {
        let body = self.post(query, variables).await?;
        let transaction = body
            .pointer(&format!("/data/{field}/transaction"))
            .cloned()
            .ok_or_else(|| {
                GatewayError::new("unexpectedError", "response carried no transaction")
                    .with_details(body.clone())
            })?;
        Ok(SaleReceipt(json!({ "success": true, "transaction": transaction })))
    }

    /// Spawn `work` and route its result into `callback`.
    fn dispatch<T, Fut>(
        &self,
        callback: GatewayCallback<T>,
        work: impl FnOnce(BraintreeClient) -> Fut,
    ) -> Result<(), GatewayError>
    where
        T: Send + 'static,
        Fut: std::future::Future<Output = Result<T, GatewayError>> + Send + 'static,
    {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| GatewayError::new("runtimeUnavailable", e.to_string()))?;
        let fut = work(self.clone());
        handle.spawn(async move {
            callback(fut.await);
        });
        Ok(())
    }
}

/// First GraphQL error in a response body, mapped to a gateway error.
fn graphql_error(body: &JsonValue) -> Option<GatewayError> {
    let first = body.get("errors")?.as_array()?.first()?;
    let message = first
        .get("message")
        .and_then(JsonValue::as_str)
        .unwrap_or("unknown gateway error");
    let name = first
        .pointer("/extensions/errorClass")
        .and_then(JsonValue::as_str)
        .unwrap_or("graphqlError");
    Some(GatewayError::new(name, message).with_details(first.clone()))
}

/// Decimal string the gateway expects for amounts.
fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// `CreateClientTokenInput`. The merchant's default account is used; the
/// merchant id is a credential, not an account id.
fn client_token_input(request: ClientTokenRequest) -> JsonValue {
    let mut input = json!({ "clientToken": {} });
    if let Some(customer_id) = request.customer_id {
        input["clientToken"]["customerId"] = JsonValue::String(customer_id);
    }
    input
}

impl GatewayClient for BraintreeClient {
    fn generate_client_token(
        &self,
        request: ClientTokenRequest,
        callback: GatewayCallback<ClientTokenResponse>,
    ) -> Result<(), GatewayError> {
        let input = client_token_input(request);
        self.dispatch(callback, move |client| client.fetch_client_token(input))
    }

    fn sale(
        &self,
        request: SaleRequest,
        callback: GatewayCallback<SaleReceipt>,
    ) -> Result<(), GatewayError> {
        let (query, field) = if request.options.submit_for_settlement {
            (CHARGE_MUTATION, "chargePaymentMethod")
        } else {
            (AUTHORIZE_MUTATION, "authorizePaymentMethod")
        };
        let variables = json!({
            "input": {
                "paymentMethodId": request.payment_method_nonce,
                "transaction": { "amount": format_amount(request.amount) }
            }
        });

        self.dispatch(callback, move |client| client.submit_sale(query, field, variables))
    }
}
