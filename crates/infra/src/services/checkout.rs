//! Checkout: total the cart, charge it, record the order.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{Instrument, instrument};

use vault_core::UserId;
use vault_orders::{CartLineItem, Order, cart_total};
use vault_payments::{ClientTokenResponse, PaymentError, PaymentGatewayAdapter, SaleReceipt};

use crate::store::{OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Charge failed; nothing was persisted.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The charge went through but the order could not be stored.
    #[error("order could not be stored after a successful charge: {source}")]
    Persist {
        source: StoreError,
        receipt: SaleReceipt,
    },

    /// The checkout task ended without an outcome (panicked or was cancelled
    /// by runtime shutdown).
    #[error("checkout did not complete: {0}")]
    Interrupted(String),
}

impl CheckoutError {
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Payment(e) => e.kind(),
            CheckoutError::Persist { .. } => "persist_after_charge",
            CheckoutError::Interrupted(_) => "interrupted",
        }
    }
}

#[derive(Clone)]
pub struct CheckoutOrchestrator {
    payments: PaymentGatewayAdapter,
    orders: Arc<dyn OrderStore>,
}

impl core::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("payments", &self.payments)
            .finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    pub fn new(payments: PaymentGatewayAdapter, orders: Arc<dyn OrderStore>) -> Self {
        Self { payments, orders }
    }

    pub async fn client_token(&self) -> Result<ClientTokenResponse, PaymentError> {
        self.payments.issue_client_token().await
    }

    /// Charge the cart total and persist the order.
    ///
    /// Charge and persist run on a detached task: dropping the returned
    /// future (client disconnect) does not stop an order from being recorded
    /// for a sale the gateway settles.
    ///
    /// No compensation runs when persistence fails after the charge; the
    /// receipt is logged and returned inside the error instead.
    #[instrument(skip(self, nonce, cart), fields(buyer = %buyer, items = cart.len()))]
    pub async fn checkout(
        &self,
        nonce: &str,
        cart: Vec<CartLineItem>,
        buyer: UserId,
    ) -> Result<Order, CheckoutError> {
        let this = self.clone();
        let nonce = nonce.to_string();
        let placement = tokio::spawn(
            async move { this.charge_and_record(&nonce, cart, buyer).await }.in_current_span(),
        );

        match placement.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "checkout task ended without an outcome");
                Err(CheckoutError::Interrupted(e.to_string()))
            }
        }
    }

    async fn charge_and_record(
        &self,
        nonce: &str,
        cart: Vec<CartLineItem>,
        buyer: UserId,
    ) -> Result<Order, CheckoutError> {
        let amount = cart_total(&cart);
        let receipt = self.payments.charge(amount, nonce).await.map_err(|e| {
            tracing::warn!(kind = e.kind(), error = %e, amount, "checkout charge failed");
            e
        })?;

        let order = Order::place(cart, receipt.0.clone(), buyer, Utc::now());
        match self.orders.insert(order).await {
            Ok(order) => {
                tracing::info!(order_id = %order.id, amount, "order placed");
                Ok(order)
            }
            Err(source) => {
                tracing::error!(
                    transaction_id = receipt.transaction_id().unwrap_or("unknown"),
                    amount,
                    error = %source,
                    "charge succeeded but order was not stored"
                );
                Err(CheckoutError::Persist { source, receipt })
            }
        }
    }
}
