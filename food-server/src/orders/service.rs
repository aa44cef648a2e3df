//! Order Service
//!
//! Orders are created Pending with a priced snapshot of the cart. After that
//! the stored lines and totals never change; only the status, note and paid
//! flag are patched, and only from non-terminal states.

use chrono::Utc;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderCreate, OrderQuery, OrderStatus, OrderUpdate};

use super::pricer::OrderPricer;
use super::state_machine;
use crate::db::repository::{BranchRepository, DiningTableRepository, OrderRepository};
use crate::store::Document;
use crate::utils::id::new_object_id;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

#[derive(Debug, Clone)]
pub struct OrderService {
    orders: OrderRepository,
    branches: BranchRepository,
    tables: DiningTableRepository,
    pricer: OrderPricer,
}

fn order_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        .with_detail("order_id", id)
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        branches: BranchRepository,
        tables: DiningTableRepository,
        pricer: OrderPricer,
    ) -> Self {
        Self {
            orders,
            branches,
            tables,
            pricer,
        }
    }

    /// Price a cart and store it as a new Pending order
    pub async fn create(&self, payload: OrderCreate) -> AppResult<Order> {
        validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
        for line in &payload.menu_items {
            validate_optional_text(&line.note, "menu_items.note", MAX_NOTE_LEN)?;
        }

        if !self.branches.exists(&payload.branch_id).await? {
            return Err(AppError::with_message(
                ErrorCode::BranchNotFound,
                format!("Branch {} not found", payload.branch_id),
            )
            .with_detail("branch_id", payload.branch_id));
        }
        let table = self
            .tables
            .find_by_id(&payload.table_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::TableNotFound,
                    format!("Table {} not found", payload.table_id),
                )
                .with_detail("table_id", payload.table_id.clone())
            })?;
        if table.branch_id != payload.branch_id {
            return Err(AppError::validation(format!(
                "Table {} does not belong to branch {}",
                table.id, payload.branch_id
            ))
            .with_detail("field", "table_id"));
        }

        let priced = self.pricer.price(&payload.menu_items).await?;

        let now = Utc::now();
        let order = Order {
            id: new_object_id(),
            branch_id: payload.branch_id,
            table_id: payload.table_id,
            menu_items: priced.lines,
            total_amount: priced.total,
            status: OrderStatus::Pending,
            is_paid: false,
            note: payload.note,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert(&order).await?;

        tracing::info!(
            order_id = %order.id,
            table_id = %order.table_id,
            lines = order.menu_items.len(),
            total_amount = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    pub async fn list(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all(query).await?)
    }

    /// One order with its current catalog entries embedded
    pub async fn get(&self, id: &str) -> AppResult<Order> {
        self.orders
            .find_detail(id)
            .await?
            .ok_or_else(|| order_not_found(id))
    }

    /// Patch note / paid flag / status
    ///
    /// The write is guarded by the status that was read, so a concurrent
    /// settlement or cancel makes this update fail instead of overwriting it.
    pub async fn update(&self, id: &str, payload: OrderUpdate) -> AppResult<Order> {
        validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

        let current = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| order_not_found(id))?;

        match current.status {
            OrderStatus::Completed => {
                return Err(AppError::with_message(
                    ErrorCode::OrderAlreadyCompleted,
                    format!("Order {id} is already completed"),
                )
                .with_detail("order_id", id));
            }
            OrderStatus::Cancelled => {
                return Err(AppError::with_message(
                    ErrorCode::OrderAlreadyCancelled,
                    format!("Order {id} is already cancelled"),
                )
                .with_detail("order_id", id));
            }
            OrderStatus::Pending | OrderStatus::InProgress => {}
        }

        let mut patch = Document::new();
        let mut next_status = current.status;
        if let Some(target) = payload.status
            && let Some(event) = state_machine::event_for_target(current.status, target)?
        {
            next_status = state_machine::apply(current.status, event)?;
            patch.insert("status".into(), Value::from(next_status.as_str()));
            tracing::info!(order_id = %id, from = %current.status, to = %next_status, event = event.name(), "Order status changed");
        }
        if let Some(note) = payload.note {
            patch.insert("note".into(), Value::String(note));
        }
        if let Some(is_paid) = payload.is_paid {
            if is_paid && next_status != OrderStatus::Completed {
                tracing::warn!(order_id = %id, status = %next_status, "Order marked paid without settlement");
            }
            patch.insert("is_paid".into(), Value::Bool(is_paid));
        }

        if patch.is_empty() {
            return self.get(id).await;
        }

        let matched = self.orders.update_guarded(id, current.status, patch).await?;
        if matched == 0 {
            return Err(AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!("Order {id} changed concurrently, reload and retry"),
            )
            .with_detail("order_id", id)
            .with_detail("expected_status", current.status.as_str()));
        }
        self.get(id).await
    }

    /// Delete an order that is not completed
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let deleted = self.orders.delete_unless_completed(id).await?;
        if deleted > 0 {
            tracing::info!(order_id = %id, "Order deleted");
            return Ok(());
        }
        match self.orders.find_by_id(id).await? {
            Some(order) if order.status == OrderStatus::Completed => Err(AppError::with_message(
                ErrorCode::OrderAlreadyCompleted,
                format!("Order {id} is settled and cannot be deleted"),
            )
            .with_detail("order_id", id)),
            _ => Err(order_not_found(id)),
        }
    }
}
