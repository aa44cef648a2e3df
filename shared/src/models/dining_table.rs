//! Dining Table Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Branch;

/// Dining table entity (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub seats: u32,
    #[serde(default)]
    pub is_reserved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owning branch, only present on joined reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub branch_id: String,
    pub name: String,
    pub seats: Option<u32>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub seats: Option<u32>,
    pub is_reserved: Option<bool>,
}

/// Table list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableQuery {
    pub branch_id: Option<String>,
}
