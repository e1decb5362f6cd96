//! Server-confirmed orders and payment method selection.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ciclo_core::{OrderId, ProductKey};

/// How the reservation will be paid.
///
/// Exactly two choices exist; the selection is required before an order
/// can be placed and is persisted so the payment step re-hydrates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Pay online through the external payment processor.
    PayPal,
    /// Pay in cash at the venue.
    Cash,
}

impl PaymentMethod {
    /// Wire/storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PayPal => "PayPal",
            Self::Cash => "Cash",
        }
    }

    /// Parse the wire/storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PayPal" => Some(Self::PayPal),
            "Cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line-item snapshot inside an order.
///
/// Copies of the cart lines at placement time; the underlying product may
/// later change price or stock without affecting the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Stable identifier of the underlying product.
    #[serde(rename = "_key")]
    pub key: ProductKey,
    /// Display name at placement time.
    pub name: String,
    /// Unit price at placement time.
    pub price: Decimal,
    /// Booked quantity.
    pub quantity: u32,
    /// Resolved image URL at placement time.
    pub image: String,
}

/// A server-confirmed order.
///
/// Line items and prices are immutable once created; only the paid
/// flag/timestamp may transition, and only forward (unpaid to paid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned, opaque identifier.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Line-item snapshots taken at placement time.
    pub order_items: Vec<OrderItem>,
    /// Sum of line totals, rounded once.
    pub items_price: Decimal,
    /// Amount due; equals `items_price` for ticket reservations.
    pub total_price: Decimal,
    /// Payment method chosen in the checkout wizard.
    pub payment_method: PaymentMethod,
    /// Whether payment has been captured server-side.
    #[serde(default)]
    pub is_paid: bool,
    /// When payment was captured, if it was.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}
