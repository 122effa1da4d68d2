//! Infrastructure layer: persistence and the application services that
//! orchestrate domain rules, stores and the payment gateway.

pub mod services;
pub mod store;
