//! Catalog product records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ciclo_core::{ProductKey, Slug};

/// Slug wrapper as stored by the content API (`slug.current`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugRef {
    /// The routing key itself.
    pub current: Slug,
}

/// A show/performance document from the catalog store.
///
/// The query projection resolves the poster image to a plain CDN URL, so
/// `image` is a string here rather than an asset reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document identifier; doubles as the cart's product key.
    #[serde(rename = "_id")]
    pub id: ProductKey,
    /// Show name.
    pub name: String,
    /// Routing key to the product page.
    pub slug: SlugRef,
    /// Ticket price in euros.
    pub price: Decimal,
    /// Resolved poster image URL.
    pub image: String,
    /// Remaining bookable tickets at query time.
    pub count_in_stock: i64,
    /// Long-form description.
    pub description: String,
    /// Category used by the search filter control.
    pub category: String,
    /// Average rating, used by the top-rated sort.
    pub rating: f64,
}
