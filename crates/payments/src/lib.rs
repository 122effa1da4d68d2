//! Payment gateway integration.
//!
//! Gateway SDKs report results through callbacks; [`PaymentGatewayAdapter`]
//! turns each call into a single awaitable result.

pub mod adapter;
pub mod braintree;
pub mod config;
pub mod gateway;
pub mod local;

pub use adapter::{PaymentError, PaymentGatewayAdapter};
pub use braintree::BraintreeClient;
pub use config::{GatewayConfig, GatewayEnvironment};
pub use gateway::{
    ClientTokenRequest, ClientTokenResponse, GatewayCallback, GatewayClient, GatewayError,
    SaleOptions, SaleReceipt, SaleRequest,
};
pub use local::LocalGatewayClient;
