//! Shared fixtures for integration tests
//!
//! In-memory store, log-only notifier and a temp-dir blob store, seeded with
//! one branch, table, category, menu (10.00 - 1.00) and add-on (2.00).

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use food_server::core::{Config, ServerState};
use food_server::services::{LocalBlobStore, LogNotifier};
use food_server::store::{
    Document, DocumentStore, Filter, StoreError, StoreHandle, StoreResult, collections,
};
use serde_json::{Value, json};
use shared::models::Role;
use tempfile::TempDir;

pub struct TestApp {
    pub state: ServerState,
    pub notifier: Arc<LogNotifier>,
    /// Keeps the uploads directory alive
    pub dir: TempDir,
}

pub fn build_state(store: StoreHandle) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::with_overrides(dir.path().to_string_lossy(), 18080);
    let notifier = Arc::new(LogNotifier::new());
    let blobs = Arc::new(LocalBlobStore::new(
        dir.path().join("uploads"),
        "http://localhost:18080/uploads",
    ));
    let state = ServerState::from_parts(config, store, blobs, notifier.clone());
    TestApp {
        state,
        notifier,
        dir,
    }
}

/// Memory-backed app with the standard catalog
pub async fn seeded_app() -> TestApp {
    let store = StoreHandle::memory();
    seed(&store).await;
    build_state(store)
}

pub async fn insert(store: &StoreHandle, collection: &str, doc: Value) {
    store
        .insert(collection, doc.as_object().cloned().expect("object"))
        .await
        .expect("seed insert");
}

pub async fn seed(store: &StoreHandle) {
    let ts = Utc::now().to_rfc3339();
    insert(store, collections::BRANCHES, json!({
        "id": "b1", "name": "Yangon Downtown", "created_at": ts, "updated_at": ts
    }))
    .await;
    insert(store, collections::BRANCHES, json!({
        "id": "b2", "name": "Mandalay", "created_at": ts, "updated_at": ts
    }))
    .await;
    insert(store, collections::TABLES, json!({
        "id": "t1", "branch_id": "b1", "name": "A1", "seats": 4,
        "created_at": ts, "updated_at": ts
    }))
    .await;
    insert(store, collections::CATEGORIES, json!({
        "id": "c1", "branch_id": "b1", "title": "Noodles",
        "created_at": ts, "updated_at": ts
    }))
    .await;
    insert(store, collections::MENUS, json!({
        "id": "M1", "branch_id": "b1", "category_id": "c1", "title": "Mohinga",
        "price": "10.00", "discount": "1.00", "is_available": true, "images": [],
        "created_at": ts, "updated_at": ts
    }))
    .await;
    insert(store, collections::ADD_ONS, json!({
        "id": "A1", "menu_id": "M1", "title": "Fritter", "price": "2.00",
        "is_available": true, "created_at": ts, "updated_at": ts
    }))
    .await;
}

/// Insert an order document directly
pub async fn insert_order(store: &StoreHandle, id: &str, status: &str, total: &str) {
    let ts = Utc::now().to_rfc3339();
    insert(store, collections::ORDERS, json!({
        "id": id, "branch_id": "b1", "table_id": "t1", "menu_items": [],
        "total_amount": total, "status": status, "is_paid": false,
        "created_at": ts, "updated_at": ts
    }))
    .await;
}

/// Insert a verified user with `role` and return a bearer token for it
pub async fn user_token(app: &TestApp, id: &str, role: Role) -> String {
    let ts = Utc::now().to_rfc3339();
    let email = format!("{id}@nanofood.test");
    insert(&app.state.store, collections::USERS, json!({
        "id": id, "name": id, "email": email, "password_hash": "unused",
        "role": u8::from(role), "is_verified": true,
        "created_at": ts, "updated_at": ts
    }))
    .await;
    let token = app
        .state
        .jwt_service
        .generate_token(id, &email, role)
        .expect("token");
    format!("Bearer {token}")
}

/// Wraps a store and fails every insert into `failing_collection`
pub struct FailingInserts {
    pub inner: Arc<dyn DocumentStore>,
    pub failing_collection: &'static str,
}

#[async_trait::async_trait]
impl DocumentStore for FailingInserts {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<Vec<Document>> {
        self.inner.find_many(collection, filter).await
    }

    async fn insert(
        &self,
        collection: &str,
        doc: Document,
    ) -> StoreResult<String> {
        if collection == self.failing_collection {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        self.inner.insert(collection, doc).await
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> StoreResult<u64> {
        self.inner.update(collection, filter, patch).await
    }

    async fn delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<u64> {
        self.inner.delete(collection, filter).await
    }
}

/// What the next `update` on a [`FailingUpdates`] collection does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Forward to the inner store
    Apply,
    /// Backend error, nothing written
    Fail,
    /// Report zero matches without writing, as if another writer got there first
    MatchNothing,
}

/// Wraps a store and scripts the updates on one collection
///
/// Updates are consumed from the script in order; once it runs out every
/// update is applied normally.
pub struct FailingUpdates {
    inner: Arc<dyn DocumentStore>,
    collection: &'static str,
    script: Mutex<VecDeque<UpdateOutcome>>,
}

impl FailingUpdates {
    pub fn new(
        inner: Arc<dyn DocumentStore>,
        collection: &'static str,
        script: impl IntoIterator<Item = UpdateOutcome>,
    ) -> Self {
        Self {
            inner,
            collection,
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FailingUpdates {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<Vec<Document>> {
        self.inner.find_many(collection, filter).await
    }

    async fn insert(
        &self,
        collection: &str,
        doc: Document,
    ) -> StoreResult<String> {
        self.inner.insert(collection, doc).await
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> StoreResult<u64> {
        let outcome = if collection == self.collection {
            self.script.lock().pop_front().unwrap_or(UpdateOutcome::Apply)
        } else {
            UpdateOutcome::Apply
        };
        match outcome {
            UpdateOutcome::Apply => self.inner.update(collection, filter, patch).await,
            UpdateOutcome::Fail => Err(StoreError::Backend("connection reset".to_string())),
            UpdateOutcome::MatchNothing => Ok(0),
        }
    }

    async fn delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<u64> {
        self.inner.delete(collection, filter).await
    }
}
