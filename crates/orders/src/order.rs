use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vault_core::{Entity, OrderId, UserId};

use crate::cart::CartLineItem;

/// Fulfilment status vocabulary. The serialized spellings are the stored
/// values and are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Not Process")]
    NotProcess,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "deliverd")]
    Delivered,
    #[serde(rename = "cancel")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotProcess => "Not Process",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "deliverd",
            OrderStatus::Cancelled => "cancel",
        }
    }
}

/// A paid order. Written once after the gateway accepted the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Cart as submitted by the buyer; not re-checked against the catalog.
    pub products: Vec<CartLineItem>,
    /// Gateway receipt, stored opaque.
    pub payment: JsonValue,
    pub buyer: UserId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn place(
        products: Vec<CartLineItem>,
        payment: JsonValue,
        buyer: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            products,
            payment,
            buyer,
            status: OrderStatus::NotProcess,
            created_at: now,
        }
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
