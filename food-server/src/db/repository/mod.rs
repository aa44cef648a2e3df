//! Repository Module
//!
//! Typed CRUD over the document store, one repository per collection.

// Accounts
pub mod user;

// Location
pub mod branch;
pub mod dining_table;

// Catalog
pub mod add_on;
pub mod category;
pub mod menu;

// Orders & sales
pub mod order;
pub mod sale;

// Re-exports
pub use add_on::AddOnRepository;
pub use branch::BranchRepository;
pub use category::CategoryRepository;
pub use dining_table::DiningTableRepository;
pub use menu::MenuRepository;
pub use order::OrderRepository;
pub use sale::SaleRepository;
pub use user::UserRepository;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::{Document, Filter, StoreError, StoreHandle, to_document};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::with_message(ErrorCode::NotFound, what),
            RepoError::Duplicate(what) => AppError::with_message(ErrorCode::AlreadyExists, what),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Store(e) => e.into(),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository bound to one collection
#[derive(Debug, Clone)]
pub struct BaseRepository {
    store: StoreHandle,
    collection: &'static str,
}

impl BaseRepository {
    pub fn new(store: StoreHandle, collection: &'static str) -> Self {
        Self { store, collection }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub async fn find_by_id<T: DeserializeOwned>(&self, id: &str) -> RepoResult<Option<T>> {
        Ok(self.store.find_as(self.collection, &Filter::by_id(id)).await?)
    }

    pub async fn find_many<T: DeserializeOwned>(&self, filter: &Filter) -> RepoResult<Vec<T>> {
        Ok(self.store.find_many_as(self.collection, filter).await?)
    }

    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        Ok(self
            .store
            .find(self.collection, &Filter::by_id(id))
            .await?
            .is_some())
    }

    pub async fn insert<T: Serialize>(&self, value: &T) -> RepoResult<String> {
        Ok(self.store.insert_as(self.collection, value).await?)
    }

    /// Apply a partial update and return the updated entity
    pub async fn patch<T: DeserializeOwned>(&self, id: &str, mut patch: Document) -> RepoResult<T> {
        patch.insert("updated_at".to_string(), now_value());
        let matched = self
            .store
            .update(self.collection, &Filter::by_id(id), patch)
            .await?;
        if matched == 0 {
            return Err(RepoError::NotFound(format!("{}:{id}", self.collection)));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("{}:{id}", self.collection)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        Ok(self
            .store
            .delete(self.collection, &Filter::by_id(id))
            .await?
            > 0)
    }
}

/// Build a patch from an update payload, skipping absent (`None`) fields
pub fn patch_of<T: Serialize>(update: &T) -> RepoResult<Document> {
    let mut doc = to_document(update)?;
    doc.retain(|_, v| !v.is_null());
    Ok(doc)
}

/// Current time as a document value
pub(crate) fn now_value() -> Value {
    serde_json::to_value(Utc::now()).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::BranchUpdate;

    #[test]
    fn test_patch_of_skips_none() {
        let patch = patch_of(&BranchUpdate {
            name: Some("Downtown".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["name"], "Downtown");
    }

    #[test]
    fn test_repo_error_mapping() {
        let err: AppError = RepoError::NotFound("menus:m1".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err: AppError = RepoError::Store(StoreError::Backend("io".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
