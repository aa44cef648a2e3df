//! Branch Repository

use chrono::Utc;
use shared::models::{Branch, BranchCreate, BranchUpdate};

use super::{BaseRepository, RepoResult, patch_of};
use crate::store::{Filter, StoreHandle, collections};
use crate::utils::id::new_object_id;

#[derive(Debug, Clone)]
pub struct BranchRepository {
    base: BaseRepository,
}

impl BranchRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::BRANCHES),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Branch>> {
        self.base.find_many(&Filter::new()).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Branch>> {
        self.base.find_by_id(id).await
    }

    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        self.base.exists(id).await
    }

    pub async fn create(&self, data: BranchCreate) -> RepoResult<Branch> {
        let now = Utc::now();
        let branch = Branch {
            id: new_object_id(),
            name: data.name,
            address: data.address,
            contact: data.contact,
            created_at: now,
            updated_at: now,
        };
        self.base.insert(&branch).await?;
        Ok(branch)
    }

    pub async fn update(&self, id: &str, data: BranchUpdate) -> RepoResult<Branch> {
        self.base.patch(id, patch_of(&data)?).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
