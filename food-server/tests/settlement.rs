//! 结账集成测试
//!
//! 通过 ServerState 组装的 SaleService 走完整结账流程，包括存储写入失败后的回滚。

mod common;

use std::sync::Arc;
use std::time::Duration;

use food_server::ErrorCode;
use food_server::store::{Filter, MemoryStore, StoreHandle, collections};
use rust_decimal::Decimal;
use serde_json::json;
use shared::models::{OrderStatus, SaleCreate, SaleQuery};

use common::{
    FailingInserts, FailingUpdates, UpdateOutcome, build_state, insert_order, seed, seeded_app,
};

fn sale_for(order_ids: &[&str]) -> SaleCreate {
    SaleCreate {
        branch_id: "b1".into(),
        table_id: "t1".into(),
        order_ids: order_ids.iter().map(|s| s.to_string()).collect(),
        discount: Decimal::new(1000, 2),
        tax: Decimal::new(500, 2),
        payment_method: Some("cash".into()),
        note: Some("table A1".into()),
    }
}

#[tokio::test]
async fn settles_two_orders_into_one_sale() {
    let app = seeded_app().await;
    insert_order(&app.state.store, "O1", "in_progress", "60.00").await;
    insert_order(&app.state.store, "O3", "in_progress", "40.00").await;

    let sale = app.state.sales.create(sale_for(&["O1", "O3"])).await.unwrap();
    assert_eq!(sale.total_amount, Decimal::new(10000, 2));
    assert_eq!(sale.grand_total, Decimal::new(9500, 2));

    for id in ["O1", "O3"] {
        let order = app.state.orders.get(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.is_paid);
    }

    let listed = app
        .state
        .sales
        .list(&SaleQuery {
            branch_id: Some("b1".into()),
            table_id: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, sale.id);
}

#[tokio::test]
async fn missing_order_leaves_everything_untouched() {
    let app = seeded_app().await;
    insert_order(&app.state.store, "O1", "in_progress", "60.00").await;

    let err = app.state.sales.create(sale_for(&["O1", "O2"])).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
    assert_eq!(err.detail("order_id"), Some(&json!("O2")));
    assert_eq!(err.detail("partial"), Some(&json!(false)));

    let order = app.state.orders.get("O1").await.unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert!(!order.is_paid);
    assert!(app.state.sales.list(&SaleQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_sale_insert_reverts_completed_orders() {
    let memory = Arc::new(MemoryStore::new());
    let seed_handle = StoreHandle::new(memory.clone(), Duration::from_secs(5));
    seed(&seed_handle).await;
    insert_order(&seed_handle, "O1", "in_progress", "60.00").await;
    insert_order(&seed_handle, "O3", "in_progress", "40.00").await;

    let failing = StoreHandle::new(
        Arc::new(FailingInserts {
            inner: memory.clone(),
            failing_collection: collections::SALES,
        }),
        Duration::from_secs(5),
    );
    let app = build_state(failing);

    let err = app.state.sales.create(sale_for(&["O1", "O3"])).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert_eq!(err.detail("partial"), Some(&json!(false)));
    assert_eq!(err.detail("step"), Some(&json!("insert_sale")));

    for id in ["O1", "O3"] {
        let order = app.state.orders.get(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::InProgress, "order {id} reverted");
        assert!(!order.is_paid);
    }
    assert!(memory.is_empty(collections::SALES));
}

/// Memory store seeded with O1 (60.00) and O3 (40.00), both in progress
async fn memory_with_two_orders() -> Arc<MemoryStore> {
    let memory = Arc::new(MemoryStore::new());
    let handle = StoreHandle::new(memory.clone(), Duration::from_secs(5));
    seed(&handle).await;
    insert_order(&handle, "O1", "in_progress", "60.00").await;
    insert_order(&handle, "O3", "in_progress", "40.00").await;
    memory
}

async fn status_of(memory: &Arc<MemoryStore>, id: &str) -> (OrderStatus, bool) {
    let order = StoreHandle::new(memory.clone(), Duration::from_secs(5))
        .find_as::<shared::models::Order>(collections::ORDERS, &Filter::by_id(id))
        .await
        .unwrap()
        .unwrap();
    (order.status, order.is_paid)
}

#[tokio::test]
async fn failed_insert_and_failed_revert_reports_partial_settlement() {
    use UpdateOutcome::{Apply, Fail};

    let memory = memory_with_two_orders().await;
    // both completions land, both reverts fail
    let store = FailingUpdates::new(
        Arc::new(FailingInserts {
            inner: memory.clone(),
            failing_collection: collections::SALES,
        }),
        collections::ORDERS,
        [Apply, Apply, Fail, Fail],
    );
    let app = build_state(StoreHandle::new(Arc::new(store), Duration::from_secs(5)));

    let err = app.state.sales.create(sale_for(&["O1", "O3"])).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SettlementPartiallyApplied);
    assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.detail("partial"), Some(&json!(true)));
    assert_eq!(err.detail("step"), Some(&json!("insert_sale")));
    assert_eq!(err.detail("transitioned_orders"), Some(&json!(["O1", "O3"])));

    assert_eq!(status_of(&memory, "O1").await, (OrderStatus::Completed, true));
    assert_eq!(status_of(&memory, "O3").await, (OrderStatus::Completed, true));
    assert!(memory.is_empty(collections::SALES));
}

#[tokio::test]
async fn conflict_on_second_order_reverts_the_first() {
    use UpdateOutcome::{Apply, MatchNothing};

    let memory = memory_with_two_orders().await;
    let store = FailingUpdates::new(memory.clone(), collections::ORDERS, [Apply, MatchNothing]);
    let app = build_state(StoreHandle::new(Arc::new(store), Duration::from_secs(5)));

    let err = app.state.sales.create(sale_for(&["O1", "O3"])).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SettlementConflict);
    assert_eq!(err.detail("partial"), Some(&json!(false)));
    assert_eq!(err.detail("step"), Some(&json!("complete_orders")));
    assert_eq!(err.detail("order_id"), Some(&json!("O3")));

    assert_eq!(status_of(&memory, "O1").await, (OrderStatus::InProgress, false));
    assert_eq!(status_of(&memory, "O3").await, (OrderStatus::InProgress, false));
    assert!(memory.is_empty(collections::SALES));
}

#[tokio::test]
async fn conflict_with_failed_revert_names_the_stuck_order() {
    use UpdateOutcome::{Apply, Fail, MatchNothing};

    let memory = memory_with_two_orders().await;
    let store = FailingUpdates::new(memory.clone(), collections::ORDERS, [Apply, MatchNothing, Fail]);
    let app = build_state(StoreHandle::new(Arc::new(store), Duration::from_secs(5)));

    let err = app.state.sales.create(sale_for(&["O1", "O3"])).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SettlementPartiallyApplied);
    assert_eq!(err.detail("partial"), Some(&json!(true)));
    assert_eq!(err.detail("step"), Some(&json!("complete_orders")));
    assert_eq!(err.detail("transitioned_orders"), Some(&json!(["O1"])));

    assert_eq!(status_of(&memory, "O1").await, (OrderStatus::Completed, true));
    assert_eq!(status_of(&memory, "O3").await, (OrderStatus::InProgress, false));
}

#[tokio::test]
async fn oversized_tax_is_rejected_without_touching_orders() {
    let memory = memory_with_two_orders().await;
    let app = build_state(StoreHandle::new(memory.clone(), Duration::from_secs(5)));

    let mut payload = sale_for(&["O1", "O3"]);
    payload.tax = Decimal::MAX;
    let err = app.state.sales.create(payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAmount);
    assert_eq!(err.detail("field"), Some(&json!("tax")));
    assert_eq!(err.detail("partial"), Some(&json!(false)));

    assert_eq!(status_of(&memory, "O1").await, (OrderStatus::InProgress, false));
    assert!(memory.is_empty(collections::SALES));
}

#[tokio::test]
async fn table_of_another_branch_is_rejected() {
    let memory = memory_with_two_orders().await;
    let handle = StoreHandle::new(memory.clone(), Duration::from_secs(5));
    common::insert(&handle, collections::TABLES, json!({
        "id": "t2", "branch_id": "b2", "name": "M1", "seats": 2,
        "created_at": chrono::Utc::now().to_rfc3339(),
        "updated_at": chrono::Utc::now().to_rfc3339()
    }))
    .await;
    let app = build_state(handle);

    let mut payload = sale_for(&["O1"]);
    payload.table_id = "t2".into();
    let err = app.state.sales.create(payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BranchMismatch);
    assert_eq!(err.detail("step"), Some(&json!("validate")));
    assert_eq!(status_of(&memory, "O1").await, (OrderStatus::InProgress, false));
}

#[tokio::test]
async fn concurrent_settlements_complete_an_order_once() {
    let app = seeded_app().await;
    insert_order(&app.state.store, "O1", "in_progress", "60.00").await;

    let (a, b) = tokio::join!(
        app.state.sales.create(sale_for(&["O1"])),
        app.state.sales.create(sale_for(&["O1"])),
    );

    let outcomes = [a, b];
    let settled = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(settled, 1);

    let loser = outcomes
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one settlement must lose");
    assert!(matches!(
        loser.code,
        ErrorCode::SettlementConflict | ErrorCode::OrderInvalidTransition
    ));
    assert_eq!(app.state.sales.list(&SaleQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_sale_keeps_orders_completed() {
    let app = seeded_app().await;
    insert_order(&app.state.store, "O1", "in_progress", "60.00").await;
    let sale = app.state.sales.create(sale_for(&["O1"])).await.unwrap();

    app.state.sales.delete(&sale.id).await.unwrap();

    let order = app.state.orders.get("O1").await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    let err = app.state.sales.get(&sale.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SaleNotFound);
}
