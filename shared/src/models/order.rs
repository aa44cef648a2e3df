//! Order Model
//!
//! Orders carry a priced snapshot of every line: unit prices and subtotals
//! are copied from the catalog when the order is created and never
//! re-resolved afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AddOn, Menu};

/// Order status
///
/// Serialized as snake_case. The legacy numeric codes (`"001"`..`"004"`)
/// are still accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[serde(alias = "001")]
    Pending,
    #[serde(alias = "002")]
    InProgress,
    #[serde(alias = "003")]
    Completed,
    #[serde(alias = "004")]
    Cancelled,
}

impl OrderStatus {
    /// Completed and Cancelled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Wire name, as stored in the document store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Request payloads (cart)
// =============================================================================

/// Add-on selection on a cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOnLine {
    pub add_on_id: String,
    /// Signed so that non-positive input can be reported as `InvalidQuantity`
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// One requested menu item with its add-ons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub add_on_items: Vec<AddOnLine>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub branch_id: String,
    pub table_id: String,
    #[serde(default)]
    pub menu_items: Vec<CartLine>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Update order payload
///
/// `status` goes through the order state machine; `completed` is rejected
/// here because only settlement may complete an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub note: Option<String>,
    pub is_paid: Option<bool>,
}

/// Order list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub branch_id: Option<String>,
    pub table_id: Option<String>,
    pub status: Option<OrderStatus>,
}

// =============================================================================
// Stored order
// =============================================================================

/// Priced add-on snapshot inside an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAddOn {
    pub add_on_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    #[serde(default)]
    pub note: Option<String>,
    /// Current catalog entry, only present on detail reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_on_details: Option<AddOn>,
}

/// Priced menu line snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    #[serde(default)]
    pub add_on_items: Vec<OrderAddOn>,
    pub add_on_subtotal: Decimal,
    pub subtotal: Decimal,
    #[serde(default)]
    pub note: Option<String>,
    /// Current catalog entry, only present on detail reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_details: Option<Menu>,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub branch_id: String,
    pub table_id: String,
    pub menu_items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub is_paid: bool,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the line subtotals; equals `total_amount` for every stored order
    pub fn line_total(&self) -> Decimal {
        self.menu_items.iter().map(|item| item.subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(OrderStatus::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_status_legacy_codes() {
        let status: OrderStatus = serde_json::from_str("\"001\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
        let status: OrderStatus = serde_json::from_str("\"003\"").unwrap();
        assert_eq!(status, OrderStatus::Completed);
        assert!(serde_json::from_str::<OrderStatus>("\"009\"").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_cart_defaults() {
        let cart: OrderCreate = serde_json::from_str(
            r#"{"branch_id":"b","table_id":"t","menu_items":[{"menu_id":"M1","quantity":2}]}"#,
        )
        .unwrap();
        assert_eq!(cart.menu_items.len(), 1);
        assert!(cart.menu_items[0].add_on_items.is_empty());
        assert!(cart.note.is_none());
    }
}
