//! Cart aggregate and line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ciclo_core::{ProductKey, Slug, round2};

use super::order::OrderItem;

/// One product-and-quantity entry in the cart.
///
/// `count_in_stock` is the stock snapshot captured when the line was
/// last touched; it bounds the quantity selector in the cart view and is
/// refreshed from a live lookup on every quantity change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Stable identifier of the underlying product.
    #[serde(rename = "_key")]
    pub key: ProductKey,
    /// Display name.
    pub name: String,
    /// Stock snapshot at the time the line was added or last updated.
    pub count_in_stock: i64,
    /// Routing key back to the product page.
    pub slug: Slug,
    /// Unit price in euros.
    pub price: Decimal,
    /// Resolved image URL.
    pub image: String,
    /// Booked quantity, always positive.
    pub quantity: u32,
}

/// Ordered collection of cart lines, at most one per product key.
///
/// Insertion order is preserved for display. Derived values are
/// recomputed on every read; no total is ever cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// All line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product key, if present.
    #[must_use]
    pub fn get(&self, key: &ProductKey) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.key == key)
    }

    /// Total number of tickets across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of `quantity x price` over all lines, rounded to 2 decimals
    /// exactly once.
    #[must_use]
    pub fn items_price(&self) -> Decimal {
        round2(
            self.items
                .iter()
                .map(|item| item.price * Decimal::from(item.quantity))
                .sum(),
        )
    }

    /// Line-item snapshots for order placement: stock and slug stripped,
    /// identity, name, price, quantity and image retained.
    #[must_use]
    pub fn snapshot_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|item| OrderItem {
                key: item.key.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                image: item.image.clone(),
            })
            .collect()
    }

    /// Insert or replace the line for `item.key`.
    ///
    /// An existing line keeps its display position; its quantity and stock
    /// snapshot are replaced, never summed.
    pub(crate) fn upsert(&mut self, item: CartLineItem) {
        match self.items.iter_mut().find(|line| line.key == item.key) {
            Some(line) => *line = item,
            None => self.items.push(item),
        }
    }

    /// Delete the line for a product key; no-op when absent.
    pub(crate) fn remove(&mut self, key: &ProductKey) {
        self.items.retain(|item| &item.key != key);
    }

    /// Empty the collection.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
