use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One cart entry, as held and submitted by the client.
///
/// Only `price` is interpreted. Every other attribute the client sent
/// (product id, name, ...) is kept verbatim so the order stores exactly what
/// was bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub price: f64,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl CartLineItem {
    pub fn priced(price: f64) -> Self {
        Self {
            price,
            attributes: Map::new(),
        }
    }
}

/// Sum of line-item prices. Plain float addition, no rounding.
pub fn cart_total(items: &[CartLineItem]) -> f64 {
    items.iter().map(|item| item.price).sum()
}
