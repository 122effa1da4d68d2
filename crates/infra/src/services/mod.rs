//! Application services used by the HTTP layer.

pub mod checkout;
pub mod product_mutation;

pub use checkout::{CheckoutError, CheckoutOrchestrator};
pub use product_mutation::{LIST_LIMIT, ProductMutationError, ProductMutationService};
