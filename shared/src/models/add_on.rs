//! Add-on Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Menu;
use super::menu::default_true;

/// Add-on entity (加料), optionally attached to one menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    #[serde(default)]
    pub menu_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Associated menu, only present on joined reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Menu>,
}

/// Create add-on payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOnCreate {
    pub menu_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_available: Option<bool>,
    pub cover: Option<String>,
}

/// Update add-on payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddOnUpdate {
    pub menu_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub cover: Option<String>,
}

/// Add-on list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddOnQuery {
    pub menu_id: Option<String>,
}
