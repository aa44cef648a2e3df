//! In-memory document store
//!
//! 使用 DashMap 按集合分片，集合内部保持插入顺序。
//! 单个集合上的 update/delete 在持有分片写锁时完成，
//! 因此带状态条件的 update 是原子的 compare-and-set。

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{Document, DocumentStore, Filter, StoreError, StoreResult};
use crate::utils::id::new_object_id;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<String> {
        let id = match doc.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                let id = new_object_id();
                doc.insert("id".to_string(), Value::String(id.clone()));
                id
            }
            Some(other) => {
                return Err(StoreError::InvalidQuery(format!(
                    "document id must be a string, got {other}"
                )));
            }
        };

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(StoreError::Duplicate(format!("{collection}:{id}")));
        }
        docs.push(doc);
        Ok(id)
    }

    async fn update(&self, collection: &str, filter: &Filter, mut patch: Document) -> StoreResult<u64> {
        // id is immutable
        patch.remove("id");
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut matched = 0;
        for doc in docs.iter_mut().filter(|d| filter.matches(d)) {
            for (key, value) in &patch {
                doc.insert(key.clone(), value.clone());
            }
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }
}
