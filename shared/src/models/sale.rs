//! Sale Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DiningTable;

/// Grand total of a sale: `total_amount - discount + tax`
///
/// May be negative when the discount exceeds the settled total.
/// `None` when the result does not fit a `Decimal`.
pub fn grand_total(total_amount: Decimal, discount: Decimal, tax: Decimal) -> Option<Decimal> {
    total_amount.checked_sub(discount)?.checked_add(tax)
}

/// Sale entity (结账单) settling one or more orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub branch_id: String,
    pub table_id: String,
    pub order_ids: Vec<String>,
    pub total_amount: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Settled table, only present on joined reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_details: Option<DiningTable>,
}

impl Sale {
    /// Whether `grand_total == total_amount - discount + tax`
    pub fn is_balanced(&self) -> bool {
        grand_total(self.total_amount, self.discount, self.tax) == Some(self.grand_total)
    }
}

/// Create sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    pub branch_id: String,
    pub table_id: String,
    pub order_ids: Vec<String>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Sale list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleQuery {
    pub branch_id: Option<String>,
    pub table_id: Option<String>,
}
