//! Entity and payload types for the Magento 2 REST API
//!
//! Magento entities are dynamic JSON objects with no schema enforced on the
//! client side; they are passed through unmodified. The aliases below only
//! document intent at call sites. A few payloads the API types strictly
//! (source items, base prices) get real structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Magento entity: an ordered mapping of field names to JSON values.
pub type Entity = serde_json::Map<String, Value>;

pub type Category = Entity;
pub type Customer = Entity;
pub type MediaEntry = Entity;
pub type Order = Entity;
pub type Product = Entity;

/// Product stock-keeping unit.
pub type Sku = String;

/// One page of a search endpoint response.
///
/// `total_count` is the server's count of all entities matching the query,
/// independent of the page size. An empty `items` list means the collection
/// is exhausted, whatever `total_count` claims.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<Entity>,
    pub total_count: u64,
}

/// Inventory source item.
///
/// `quantity` and `status` may be omitted on input payloads; Magento always
/// returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    pub sku: Sku,
    pub source_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
}

/// Base price of a product in one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePrice {
    pub price: f64,
    pub store_id: u64,
    pub sku: Sku,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserialization() {
        let page: Page =
            serde_json::from_str(r#"{"items": [{"id": 1}], "total_count": 3}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 3);

        // some endpoints omit the items key entirely on empty results
        let page: Page = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_source_item_input_serialization() {
        let item = SourceItem {
            sku: "W1033".to_string(),
            source_code: "default".to_string(),
            quantity: None,
            status: None,
        };
        assert_eq!(
            serde_json::to_string(&item).unwrap(),
            r#"{"sku":"W1033","source_code":"default"}"#
        );
    }
}
