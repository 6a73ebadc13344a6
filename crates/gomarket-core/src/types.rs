//! # Domain Types
//!
//! The line item types shared by the cart, the storage layer and the
//! storefront.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  In memory (Rust)              Device storage (JSON)                    │
//! │  ─────────────────             ─────────────────────                    │
//! │  id          String      ───►  "id": "42"                               │
//! │  title       String      ───►  "title": "Sneaker"                       │
//! │  image_url   String      ───►  "image_url": "https://..."               │
//! │  unit_price  Money(1050) ───►  "price": 10.5                            │
//! │  quantity    i64         ───►  "quantity": 2                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The JSON names are the ones the storefront has always persisted, so carts
//! saved by earlier app versions still hydrate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Line Item
// =============================================================================

/// One product placed in the cart, with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Opaque product identifier, unique within a cart.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Product image reference.
    pub image_url: String,

    /// Unit price. Persisted as a decimal `price` number.
    #[serde(rename = "price", with = "crate::money::major_units")]
    #[ts(type = "number")]
    pub unit_price: Money,

    /// Quantity in cart. Zero means the shopper decremented it away.
    pub quantity: i64,
}

impl LineItem {
    /// Builds a line item from an incoming product at quantity one.
    pub fn from_new(item: NewLineItem) -> Self {
        LineItem {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            unit_price: item.unit_price,
            quantity: 1,
        }
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Overwrites the descriptive fields with the incoming values.
    ///
    /// Quantity is left alone: it is cumulative across adds.
    pub(crate) fn refresh_from(&mut self, item: NewLineItem) {
        self.title = item.title;
        self.image_url = item.image_url;
        self.unit_price = item.unit_price;
    }
}

// =============================================================================
// New Line Item
// =============================================================================

/// A product as the storefront hands it to `add_to_cart`: everything but the
/// quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(rename = "price", with = "crate::money::major_units")]
    pub unit_price: Money,
}

impl NewLineItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        NewLineItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_storage_shape() {
        let item = LineItem {
            id: "42".to_string(),
            title: "Sneaker".to_string(),
            image_url: "https://img/42.png".to_string(),
            unit_price: Money::from_cents(1050),
            quantity: 2,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "42",
                "title": "Sneaker",
                "image_url": "https://img/42.png",
                "price": 10.5,
                "quantity": 2
            })
        );
    }

    #[test]
    fn test_line_item_reads_legacy_storage() {
        let raw = r#"{"id":"1","title":"Cap","image_url":"u","price":8.99,"quantity":3}"#;
        let item: LineItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.unit_price.cents(), 899);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.line_total().cents(), 2697);
    }

    #[test]
    fn test_from_new_starts_at_one() {
        let item = LineItem::from_new(NewLineItem::new("1", "Cap", "u", Money::from_cents(500)));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.line_total().cents(), 500);
    }
}
