//! Sale Aggregator
//!
//! Settles a set of InProgress orders into one Sale.
//!
//! The store has no multi-document transactions, so settlement runs as:
//!
//! 1. validate amounts, branch and table (the table must be in the branch)
//! 2. fetch every referenced order and compute the totals; any missing or
//!    unsettleable order, or a total that overflows, aborts before anything
//!    is written
//! 3. `in_progress -> completed` per order, each write guarded by the status
//!    read in step 2
//! 4. insert the Sale
//!
//! A failure in step 3 or 4 reverts the orders already completed. Only if
//! that revert itself fails does the caller see a partial result, labelled
//! with the failing step and the orders left completed. Writes are never
//! retried here.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    MAX_ADJUSTMENT, Order, OrderStatus, Sale, SaleCreate, checked_sum, grand_total, within_bounds,
};
use thiserror::Error;

use crate::db::repository::{
    BranchRepository, DiningTableRepository, OrderRepository, RepoError, SaleRepository,
};
use crate::orders::state_machine::{self, OrderEvent};
use crate::store::Document;
use crate::utils::id::new_object_id;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};

/// Settlement step, reported in error details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStep {
    Validate,
    FetchOrders,
    CompleteOrders,
    InsertSale,
}

impl SettlementStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::FetchOrders => "fetch_orders",
            Self::CompleteOrders => "complete_orders",
            Self::InsertSale => "insert_sale",
        }
    }
}

impl std::fmt::Display for SettlementStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("{field} must be between 0 and {max}", max = MAX_ADJUSTMENT)]
    InvalidAmount { field: &'static str },

    #[error("{field} of the settled orders is out of range")]
    AmountOverflow { field: &'static str },

    #[error(transparent)]
    InvalidInput(AppError),

    #[error("Invalid order set: {0}")]
    InvalidOrderSet(String),

    #[error("Branch {0} not found")]
    BranchNotFound(String),

    #[error("Table {0} not found")]
    TableNotFound(String),

    #[error("Table {table_id} belongs to branch {actual}, not {expected}")]
    TableBranchMismatch {
        table_id: String,
        expected: String,
        actual: String,
    },

    #[error("Order {0} not found")]
    OrderNotFound(String),

    #[error("Order {order_id} is {status}, only in-progress orders can be settled")]
    NotSettleable { order_id: String, status: OrderStatus },

    #[error("Order {order_id} belongs to branch {actual}, not {expected}")]
    BranchMismatch {
        order_id: String,
        expected: String,
        actual: String,
    },

    #[error("Order {order_id} changed during settlement")]
    Conflict { order_id: String },

    #[error("Settlement failed at {step}: {source}")]
    Failed {
        step: SettlementStep,
        #[source]
        source: RepoError,
    },

    #[error("Settlement failed at {step} and {} order(s) could not be reverted", .transitioned.len())]
    PartiallyApplied {
        step: SettlementStep,
        transitioned: Vec<String>,
        cause: String,
    },
}

impl SettlementError {
    fn step(&self) -> SettlementStep {
        match self {
            Self::InvalidAmount { .. }
            | Self::InvalidInput(_)
            | Self::InvalidOrderSet(_)
            | Self::BranchNotFound(_)
            | Self::TableNotFound(_)
            | Self::TableBranchMismatch { .. } => SettlementStep::Validate,
            Self::OrderNotFound(_)
            | Self::NotSettleable { .. }
            | Self::BranchMismatch { .. }
            | Self::AmountOverflow { .. } => SettlementStep::FetchOrders,
            Self::Conflict { .. } => SettlementStep::CompleteOrders,
            Self::Failed { step, .. } | Self::PartiallyApplied { step, .. } => *step,
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        let message = err.to_string();
        let step = err.step();
        let base = match err {
            SettlementError::InvalidAmount { field } | SettlementError::AmountOverflow { field } => {
                AppError::with_message(ErrorCode::InvalidAmount, message).with_detail("field", field)
            }
            SettlementError::InvalidInput(inner) => inner,
            SettlementError::InvalidOrderSet(_) => {
                AppError::with_message(ErrorCode::InvalidOrderSet, message)
            }
            SettlementError::BranchNotFound(id) => {
                AppError::with_message(ErrorCode::BranchNotFound, message).with_detail("branch_id", id)
            }
            SettlementError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table_id", id)
            }
            SettlementError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            SettlementError::NotSettleable { order_id, status } => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("order_id", order_id)
                    .with_detail("status", status.as_str())
            }
            SettlementError::TableBranchMismatch { table_id, .. } => {
                AppError::with_message(ErrorCode::BranchMismatch, message)
                    .with_detail("table_id", table_id)
            }
            SettlementError::BranchMismatch { order_id, .. } => {
                AppError::with_message(ErrorCode::BranchMismatch, message)
                    .with_detail("order_id", order_id)
            }
            SettlementError::Conflict { order_id } => {
                AppError::with_message(ErrorCode::SettlementConflict, message)
                    .with_detail("order_id", order_id)
            }
            SettlementError::Failed { source, .. } => {
                let inner = AppError::from(source);
                AppError {
                    message,
                    ..inner
                }
            }
            SettlementError::PartiallyApplied {
                transitioned,
                cause,
                ..
            } => {
                return AppError::with_message(ErrorCode::SettlementPartiallyApplied, message)
                    .with_detail("partial", true)
                    .with_detail("step", step.as_str())
                    .with_detail("transitioned_orders", transitioned)
                    .with_detail("cause", cause);
            }
        };
        base.with_detail("partial", false)
            .with_detail("step", step.as_str())
    }
}

fn validate(payload: &SaleCreate) -> Result<(), SettlementError> {
    if !within_bounds(payload.discount, MAX_ADJUSTMENT) {
        return Err(SettlementError::InvalidAmount { field: "discount" });
    }
    if !within_bounds(payload.tax, MAX_ADJUSTMENT) {
        return Err(SettlementError::InvalidAmount { field: "tax" });
    }
    if payload.order_ids.is_empty() {
        return Err(SettlementError::InvalidOrderSet(
            "at least one order is required".into(),
        ));
    }
    let mut seen = HashSet::with_capacity(payload.order_ids.len());
    for id in &payload.order_ids {
        if !seen.insert(id.as_str()) {
            return Err(SettlementError::InvalidOrderSet(format!(
                "order {id} is listed twice"
            )));
        }
    }
    Ok(())
}

fn failed(step: SettlementStep) -> impl Fn(RepoError) -> SettlementError {
    move |source| SettlementError::Failed { step, source }
}

fn completion_patch() -> Document {
    let mut patch = Document::new();
    patch.insert("status".into(), Value::from(OrderStatus::Completed.as_str()));
    patch.insert("is_paid".into(), Value::Bool(true));
    patch
}

fn revert_patch(order: &Order) -> Document {
    let mut patch = Document::new();
    patch.insert("status".into(), Value::from(order.status.as_str()));
    patch.insert("is_paid".into(), Value::Bool(order.is_paid));
    patch
}

#[derive(Debug, Clone)]
pub struct SaleAggregator {
    orders: OrderRepository,
    sales: SaleRepository,
    branches: BranchRepository,
    tables: DiningTableRepository,
}

impl SaleAggregator {
    pub fn new(
        orders: OrderRepository,
        sales: SaleRepository,
        branches: BranchRepository,
        tables: DiningTableRepository,
    ) -> Self {
        Self {
            orders,
            sales,
            branches,
            tables,
        }
    }

    /// Settle `payload.order_ids` into a new Sale
    pub async fn settle(&self, payload: SaleCreate) -> Result<Sale, SettlementError> {
        validate(&payload)?;
        validate_optional_text(&payload.payment_method, "payment_method", MAX_SHORT_TEXT_LEN)
            .and(validate_optional_text(&payload.note, "note", MAX_NOTE_LEN))
            .map_err(SettlementError::InvalidInput)?;

        if !self
            .branches
            .exists(&payload.branch_id)
            .await
            .map_err(failed(SettlementStep::Validate))?
        {
            return Err(SettlementError::BranchNotFound(payload.branch_id));
        }
        let table = self
            .tables
            .find_by_id(&payload.table_id)
            .await
            .map_err(failed(SettlementStep::Validate))?
            .ok_or_else(|| SettlementError::TableNotFound(payload.table_id.clone()))?;
        if table.branch_id != payload.branch_id {
            return Err(SettlementError::TableBranchMismatch {
                table_id: table.id,
                expected: payload.branch_id,
                actual: table.branch_id,
            });
        }

        let orders = self.fetch_settleable(&payload).await?;
        let total_amount = checked_sum(orders.iter().map(|o| o.total_amount))
            .ok_or(SettlementError::AmountOverflow { field: "total_amount" })?;
        let grand_total = grand_total(total_amount, payload.discount, payload.tax)
            .ok_or(SettlementError::AmountOverflow { field: "grand_total" })?;

        let mut completed: Vec<&Order> = Vec::with_capacity(orders.len());
        for order in &orders {
            let outcome = self
                .orders
                .update_guarded(&order.id, OrderStatus::InProgress, completion_patch())
                .await;
            let failure = match outcome {
                Ok(0) => SettlementError::Conflict {
                    order_id: order.id.clone(),
                },
                Ok(_) => {
                    completed.push(order);
                    continue;
                }
                Err(source) => failed(SettlementStep::CompleteOrders)(source),
            };
            return Err(self
                .compensate(&completed, SettlementStep::CompleteOrders, failure)
                .await);
        }

        let sale = Sale {
            id: new_object_id(),
            branch_id: payload.branch_id,
            table_id: payload.table_id,
            order_ids: payload.order_ids,
            total_amount,
            discount: payload.discount,
            tax: payload.tax,
            grand_total,
            payment_method: payload.payment_method,
            note: payload.note,
            created_at: Utc::now(),
            table_details: None,
        };

        if let Err(source) = self.sales.insert(&sale).await {
            let failure = failed(SettlementStep::InsertSale)(source);
            return Err(self
                .compensate(&completed, SettlementStep::InsertSale, failure)
                .await);
        }

        tracing::info!(
            sale_id = %sale.id,
            orders = sale.order_ids.len(),
            total_amount = %sale.total_amount,
            grand_total = %sale.grand_total,
            "Sale settled"
        );
        Ok(sale)
    }

    /// Load every order and check it can be completed; writes nothing
    async fn fetch_settleable(&self, payload: &SaleCreate) -> Result<Vec<Order>, SettlementError> {
        let found = self
            .orders
            .find_by_ids(&payload.order_ids)
            .await
            .map_err(failed(SettlementStep::FetchOrders))?;

        let mut orders = Vec::with_capacity(payload.order_ids.len());
        for id in &payload.order_ids {
            let order = found
                .iter()
                .find(|o| &o.id == id)
                .ok_or_else(|| SettlementError::OrderNotFound(id.clone()))?;
            if state_machine::apply(order.status, OrderEvent::Complete).is_err() {
                return Err(SettlementError::NotSettleable {
                    order_id: id.clone(),
                    status: order.status,
                });
            }
            if order.branch_id != payload.branch_id {
                return Err(SettlementError::BranchMismatch {
                    order_id: id.clone(),
                    expected: payload.branch_id.clone(),
                    actual: order.branch_id.clone(),
                });
            }
            orders.push(order.clone());
        }
        Ok(orders)
    }

    /// Revert completed orders to their pre-settlement state
    ///
    /// Returns `failure` when every revert succeeded, otherwise a
    /// `PartiallyApplied` error listing the orders left completed.
    async fn compensate(
        &self,
        completed: &[&Order],
        step: SettlementStep,
        failure: SettlementError,
    ) -> SettlementError {
        tracing::warn!(step = %step, orders = completed.len(), error = %failure, "Settlement failed, reverting orders");

        let mut stuck = Vec::new();
        for order in completed {
            match self
                .orders
                .update_guarded(&order.id, OrderStatus::Completed, revert_patch(order))
                .await
            {
                Ok(0) => {
                    tracing::error!(order_id = %order.id, "Revert matched no order");
                    stuck.push(order.id.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(order_id = %order.id, error = %e, "Revert failed");
                    stuck.push(order.id.clone());
                }
            }
        }

        if stuck.is_empty() {
            failure
        } else {
            SettlementError::PartiallyApplied {
                step,
                transitioned: stuck,
                cause: failure.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::store::{StoreHandle, collections};

    async fn seeded() -> (StoreHandle, SaleAggregator) {
        let store = StoreHandle::memory();
        let ts = "2024-01-01T00:00:00Z";
        let order = |id: &str, status: &str, branch: &str, total: &str| {
            json!({
                "id": id, "branch_id": branch, "table_id": "t1", "menu_items": [],
                "total_amount": total, "status": status, "is_paid": false,
                "created_at": ts, "updated_at": ts
            })
        };
        let docs = [
            (collections::BRANCHES, json!({"id": "b1", "name": "Main", "created_at": ts, "updated_at": ts})),
            (collections::TABLES, json!({"id": "t1", "branch_id": "b1", "name": "A1", "seats": 4, "created_at": ts, "updated_at": ts})),
            (collections::ORDERS, order("O1", "in_progress", "b1", "60.00")),
            (collections::ORDERS, order("O3", "in_progress", "b1", "40.00")),
            (collections::ORDERS, order("P1", "pending", "b1", "5.00")),
            (collections::ORDERS, order("X1", "in_progress", "b9", "5.00")),
            (collections::TABLES, json!({"id": "t9", "branch_id": "b9", "name": "Z9", "seats": 2, "created_at": ts, "updated_at": ts})),
            (collections::ORDERS, order("H1", "in_progress", "b1", "79228162514264337593543950335")),
            (collections::ORDERS, order("H2", "in_progress", "b1", "79228162514264337593543950335")),
        ];
        for (collection, doc) in docs {
            store
                .insert(collection, doc.as_object().cloned().unwrap())
                .await
                .unwrap();
        }
        let aggregator = SaleAggregator::new(
            OrderRepository::new(store.clone()),
            SaleRepository::new(store.clone()),
            BranchRepository::new(store.clone()),
            DiningTableRepository::new(store.clone()),
        );
        (store, aggregator)
    }

    fn request(order_ids: &[&str]) -> SaleCreate {
        SaleCreate {
            branch_id: "b1".into(),
            table_id: "t1".into(),
            order_ids: order_ids.iter().map(|s| s.to_string()).collect(),
            discount: Decimal::new(1000, 2),
            tax: Decimal::new(500, 2),
            payment_method: Some("cash".into()),
            note: None,
        }
    }

    async fn order_status(store: &StoreHandle, id: &str) -> (OrderStatus, bool) {
        let order = OrderRepository::new(store.clone())
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap();
        (order.status, order.is_paid)
    }

    #[tokio::test]
    async fn test_settle_completes_orders() {
        let (store, aggregator) = seeded().await;
        let sale = aggregator.settle(request(&["O1", "O3"])).await.unwrap();

        // 100.00 - 10.00 + 5.00
        assert_eq!(sale.total_amount, Decimal::new(10000, 2));
        assert_eq!(sale.grand_total, Decimal::new(9500, 2));
        assert!(sale.is_balanced());
        assert_eq!(order_status(&store, "O1").await, (OrderStatus::Completed, true));
        assert_eq!(order_status(&store, "O3").await, (OrderStatus::Completed, true));
    }

    #[tokio::test]
    async fn test_missing_order_changes_nothing() {
        let (store, aggregator) = seeded().await;
        let err = aggregator.settle(request(&["O1", "O2"])).await.unwrap_err();
        assert!(matches!(err, SettlementError::OrderNotFound(ref id) if id == "O2"));

        let app = AppError::from(err);
        assert_eq!(app.code, ErrorCode::OrderNotFound);
        assert_eq!(app.detail("partial"), Some(&json!(false)));
        assert_eq!(order_status(&store, "O1").await, (OrderStatus::InProgress, false));
        assert!(SaleRepository::new(store.clone())
            .find_all(&Default::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unsettleable_orders_rejected() {
        let (store, aggregator) = seeded().await;
        let err = aggregator.settle(request(&["O1", "P1"])).await.unwrap_err();
        assert!(matches!(err, SettlementError::NotSettleable { .. }));

        let err = aggregator.settle(request(&["O1", "X1"])).await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::BranchMismatch);
        assert_eq!(order_status(&store, "O1").await, (OrderStatus::InProgress, false));
    }

    #[tokio::test]
    async fn test_table_from_other_branch_rejected() {
        let (store, aggregator) = seeded().await;
        let mut payload = request(&["O1"]);
        payload.table_id = "t9".into();

        let err = aggregator.settle(payload).await.unwrap_err();
        assert!(matches!(err, SettlementError::TableBranchMismatch { ref actual, .. } if actual == "b9"));
        let app = AppError::from(err);
        assert_eq!(app.code, ErrorCode::BranchMismatch);
        assert_eq!(app.detail("step"), Some(&json!("validate")));
        assert_eq!(app.detail("table_id"), Some(&json!("t9")));
        assert_eq!(order_status(&store, "O1").await, (OrderStatus::InProgress, false));
    }

    #[tokio::test]
    async fn test_oversized_adjustment_rejected_before_writes() {
        let (store, aggregator) = seeded().await;
        let mut payload = request(&["O1", "O3"]);
        payload.tax = Decimal::MAX;

        let err = aggregator.settle(payload).await.unwrap_err();
        assert!(matches!(err, SettlementError::InvalidAmount { field: "tax" }));
        assert_eq!(AppError::from(err).code, ErrorCode::InvalidAmount);
        assert_eq!(order_status(&store, "O1").await, (OrderStatus::InProgress, false));
        assert_eq!(order_status(&store, "O3").await, (OrderStatus::InProgress, false));
    }

    #[tokio::test]
    async fn test_total_overflow_rejected_before_writes() {
        let (store, aggregator) = seeded().await;
        let err = aggregator.settle(request(&["H1", "H2"])).await.unwrap_err();
        assert!(matches!(err, SettlementError::AmountOverflow { field: "total_amount" }));

        let app = AppError::from(err);
        assert_eq!(app.code, ErrorCode::InvalidAmount);
        assert_eq!(app.detail("partial"), Some(&json!(false)));
        assert_eq!(order_status(&store, "H1").await, (OrderStatus::InProgress, false));
        assert_eq!(order_status(&store, "H2").await, (OrderStatus::InProgress, false));
        assert!(SaleRepository::new(store.clone())
            .find_all(&Default::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_grand_total_overflow_rejected_before_writes() {
        let (store, aggregator) = seeded().await;
        // total fits, total + 5.00 tax does not
        let mut payload = request(&["H1"]);
        payload.discount = Decimal::ZERO;

        let err = aggregator.settle(payload).await.unwrap_err();
        assert!(matches!(err, SettlementError::AmountOverflow { field: "grand_total" }));
        assert_eq!(order_status(&store, "H1").await, (OrderStatus::InProgress, false));
    }

    #[tokio::test]
    async fn test_request_validation() {
        let (_, aggregator) = seeded().await;

        let mut payload = request(&["O1"]);
        payload.discount = Decimal::new(-1, 0);
        assert!(matches!(
            aggregator.settle(payload).await,
            Err(SettlementError::InvalidAmount { field: "discount" })
        ));

        assert!(matches!(
            aggregator.settle(request(&[])).await,
            Err(SettlementError::InvalidOrderSet(_))
        ));
        assert!(matches!(
            aggregator.settle(request(&["O1", "O1"])).await,
            Err(SettlementError::InvalidOrderSet(_))
        ));

        let mut payload = request(&["O1"]);
        payload.table_id = "t404".into();
        let app = AppError::from(aggregator.settle(payload).await.unwrap_err());
        assert_eq!(app.code, ErrorCode::TableNotFound);
        assert_eq!(app.detail("step"), Some(&json!("validate")));
    }

    #[tokio::test]
    async fn test_negative_grand_total_allowed() {
        let (_, aggregator) = seeded().await;
        let mut payload = request(&["O3"]);
        payload.discount = Decimal::new(5000, 2);
        payload.tax = Decimal::ZERO;
        let sale = aggregator.settle(payload).await.unwrap();
        assert_eq!(sale.grand_total, Decimal::new(-1000, 2));
    }

    #[test]
    fn test_partial_error_details() {
        let err = SettlementError::PartiallyApplied {
            step: SettlementStep::InsertSale,
            transitioned: vec!["O1".into()],
            cause: "backend down".into(),
        };
        let app = AppError::from(err);
        assert_eq!(app.code, ErrorCode::SettlementPartiallyApplied);
        assert_eq!(app.detail("partial"), Some(&json!(true)));
        assert_eq!(app.detail("step"), Some(&json!("insert_sale")));
        assert_eq!(app.detail("transitioned_orders"), Some(&json!(["O1"])));
    }
}
