//! Document Store
//!
//! 持久化抽象层：所有仓储都通过 [`StoreHandle`] 访问 [`DocumentStore`]。
//!
//! - [`MemoryStore`]: 进程内存储 (测试 / 开发)
//! - [`SurrealStore`]: 嵌入式 SurrealDB (RocksDB)
//!
//! 每个操作都受 `StoreHandle` 的截止时间约束，超时返回
//! [`StoreError::Timeout`]，由 API 层映射为可重试错误。
//! 调用方 future 被丢弃 (客户端断开) 时，进行中的存储调用一并取消。

pub mod filter;
pub mod memory;
pub mod pipeline;
pub mod surreal;

pub use filter::{Condition, Filter};
pub use memory::MemoryStore;
pub use pipeline::{Pipeline, Stage};
pub use surreal::SurrealStore;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// A stored document: a JSON object with a string `id` field
pub type Document = Map<String, Value>;

/// Collection names
pub mod collections {
    pub const USERS: &str = "users";
    pub const BRANCHES: &str = "branches";
    pub const CATEGORIES: &str = "categories";
    pub const TABLES: &str = "tables";
    pub const MENUS: &str = "menus";
    pub const ADD_ONS: &str = "add_ons";
    pub const ORDERS: &str = "orders";
    pub const SALES: &str = "sales";
}

/// Store error types
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store operation '{operation}' timed out after {after_ms}ms")]
    Timeout { operation: &'static str, after_ms: u64 },

    #[error("Document already exists: {0}")]
    Duplicate(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout { operation, after_ms } => {
                AppError::timeout(format!("Storage did not respond in {after_ms}ms"))
                    .with_detail("operation", operation)
                    .with_detail("retriable", true)
            }
            StoreError::Duplicate(id) => AppError::already_exists(id),
            StoreError::InvalidQuery(msg) | StoreError::Serialization(msg) => {
                AppError::internal(msg)
            }
            StoreError::Backend(msg) => AppError::with_message(ErrorCode::DatabaseError, msg),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document database abstraction
///
/// `update` shallow-merges `patch` into every document matching `filter` and
/// returns the matched count; a filter on `id` plus `status` therefore acts
/// as a compare-and-set.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Backend name for logs
    fn backend(&self) -> &'static str;

    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self.find_many(collection, filter).await?.into_iter().next())
    }

    /// Insert a document; returns its id
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<String>;

    async fn update(&self, collection: &str, filter: &Filter, patch: Document) -> StoreResult<u64>;

    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<Document>> {
        pipeline::execute(self, collection, pipeline).await
    }
}

/// Shared, deadline-bounded store handle
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<dyn DocumentStore>,
    deadline: Duration,
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("backend", &self.inner.backend())
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl StoreHandle {
    pub fn new(store: Arc<dyn DocumentStore>, deadline: Duration) -> Self {
        Self {
            inner: store,
            deadline,
        }
    }

    /// In-memory handle, mainly for tests
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Duration::from_secs(5))
    }

    pub fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    backend = self.inner.backend(),
                    operation,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Store operation timed out"
                );
                Err(StoreError::Timeout {
                    operation,
                    after_ms: self.deadline.as_millis() as u64,
                })
            }
        }
    }

    pub async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        self.bounded("find", self.inner.find(collection, filter)).await
    }

    pub async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.bounded("find_many", self.inner.find_many(collection, filter))
            .await
    }

    pub async fn insert(&self, collection: &str, doc: Document) -> StoreResult<String> {
        self.bounded("insert", self.inner.insert(collection, doc)).await
    }

    pub async fn update(&self, collection: &str, filter: &Filter, patch: Document) -> StoreResult<u64> {
        self.bounded("update", self.inner.update(collection, filter, patch))
            .await
    }

    pub async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.bounded("delete", self.inner.delete(collection, filter)).await
    }

    pub async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<Document>> {
        self.bounded("aggregate", self.inner.aggregate(collection, pipeline))
            .await
    }

    // ==================== Typed helpers ====================

    pub async fn find_as<T: DeserializeOwned>(&self, collection: &str, filter: &Filter) -> StoreResult<Option<T>> {
        self.find(collection, filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn find_many_as<T: DeserializeOwned>(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<T>> {
        self.find_many(collection, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn aggregate_as<T: DeserializeOwned>(&self, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<T>> {
        self.aggregate(collection, pipeline)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn insert_as<T: Serialize>(&self, collection: &str, value: &T) -> StoreResult<String> {
        self.insert(collection, to_document(value)?).await
    }
}

/// Serialize a value into a document
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Store whose reads never finish
    struct StalledStore;

    #[async_trait]
    impl DocumentStore for StalledStore {
        fn backend(&self) -> &'static str {
            "stalled"
        }

        async fn find_many(&self, _: &str, _: &Filter) -> StoreResult<Vec<Document>> {
            std::future::pending().await
        }

        async fn insert(&self, _: &str, _: Document) -> StoreResult<String> {
            std::future::pending().await
        }

        async fn update(&self, _: &str, _: &Filter, _: Document) -> StoreResult<u64> {
            std::future::pending().await
        }

        async fn delete(&self, _: &str, _: &Filter) -> StoreResult<u64> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_deadline_produces_timeout() {
        let handle = StoreHandle::new(Arc::new(StalledStore), Duration::from_millis(20));
        let err = handle
            .find(collections::ORDERS, &Filter::by_id("o1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout { operation: "find", .. }));

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::TimeoutError);
        assert!(app.code.is_retriable());
        assert_eq!(app.detail("retriable"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
        struct Row {
            id: String,
            n: u32,
        }

        let handle = StoreHandle::memory();
        let row = Row { id: "r1".into(), n: 7 };
        handle.insert_as("rows", &row).await.unwrap();

        let found: Option<Row> = handle.find_as("rows", &Filter::by_id("r1")).await.unwrap();
        assert_eq!(found, Some(row));
    }

    #[test]
    fn test_to_document_rejects_scalars() {
        assert!(to_document(&42).is_err());
    }
}
