//! Dining Table Repository

use chrono::Utc;
use shared::models::{DiningTable, DiningTableCreate, DiningTableQuery, DiningTableUpdate};

use super::{BaseRepository, RepoResult, patch_of};
use crate::store::{Filter, Pipeline, StoreHandle, collections};
use crate::utils::id::new_object_id;

/// Seats when the request does not say
const DEFAULT_SEATS: u32 = 4;

#[derive(Debug, Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::TABLES),
        }
    }

    /// List tables, each joined with its branch
    pub async fn find_all(&self, query: &DiningTableQuery) -> RepoResult<Vec<DiningTable>> {
        let pipeline = Pipeline::new()
            .matching(Filter::new().eq_opt("branch_id", query.branch_id.clone()))
            .lookup(collections::BRANCHES, "branch_id", "id", "branch")
            .unwind("branch", true)
            .sort("name", false);
        Ok(self
            .base
            .store()
            .aggregate_as(collections::TABLES, &pipeline)
            .await?)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        self.base.find_by_id(id).await
    }

    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        self.base.exists(id).await
    }

    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        let now = Utc::now();
        let table = DiningTable {
            id: new_object_id(),
            branch_id: data.branch_id,
            name: data.name,
            seats: data.seats.unwrap_or(DEFAULT_SEATS),
            is_reserved: false,
            created_at: now,
            updated_at: now,
            branch: None,
        };
        self.base.insert(&table).await?;
        Ok(table)
    }

    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        self.base.patch(id, patch_of(&data)?).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
