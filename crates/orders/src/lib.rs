//! Orders domain module.
//!
//! Cart line items as submitted by the client, the checkout total, and the
//! order record created after a successful sale. Pure domain logic (no IO).

pub mod cart;
pub mod order;

pub use cart::{CartLineItem, cart_total};
pub use order::{Order, OrderStatus};
