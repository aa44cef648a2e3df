//! Menu Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item entity (菜品)
///
/// `price - discount` is the effective unit price charged on an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub branch_id: String,
    pub category_id: String,
    pub title: String,
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Cover image URL (blob store)
    #[serde(default)]
    pub cover: Option<String>,
    /// Gallery image URLs (blob store)
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Menu {
    /// Unit price after the menu-level discount
    pub fn effective_price(&self) -> Decimal {
        self.price - self.discount
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub branch_id: String,
    pub category_id: String,
    pub title: String,
    pub short_title: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub is_available: Option<bool>,
    pub cover: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Update menu payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub short_title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub is_available: Option<bool>,
    pub cover: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Menu list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuQuery {
    pub branch_id: Option<String>,
    pub category_id: Option<String>,
    pub is_available: Option<bool>,
    /// Case-insensitive title search
    pub search: Option<String>,
}

/// Availability toggle payload (menus and add-ons)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub is_available: bool,
}
