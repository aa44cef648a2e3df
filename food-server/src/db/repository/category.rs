//! Category Repository

use chrono::Utc;
use shared::models::{Category, CategoryCreate, CategoryQuery, CategoryUpdate};

use super::{BaseRepository, RepoResult, patch_of};
use crate::store::{Filter, StoreHandle, collections};
use crate::utils::id::new_object_id;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::CATEGORIES),
        }
    }

    pub async fn find_all(&self, query: &CategoryQuery) -> RepoResult<Vec<Category>> {
        let filter = Filter::new().eq_opt("branch_id", query.branch_id.clone());
        self.base.find_many(&filter).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        self.base.find_by_id(id).await
    }

    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        self.base.exists(id).await
    }

    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: new_object_id(),
            branch_id: data.branch_id,
            title: data.title,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        self.base.insert(&category).await?;
        Ok(category)
    }

    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        self.base.patch(id, patch_of(&data)?).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
