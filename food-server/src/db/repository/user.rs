//! User Repository

use serde_json::json;
use shared::models::{Role, User, UserQuery};

use super::{BaseRepository, RepoError, RepoResult};
use crate::store::{Document, Filter, StoreHandle, collections};

#[derive(Debug, Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::USERS),
        }
    }

    pub async fn find_all(&self, query: &UserQuery) -> RepoResult<Vec<User>> {
        let mut filter = Filter::new()
            .eq_opt("role", query.role)
            .eq_opt("branch_id", query.branch_id.clone());
        if let Some(search) = &query.search {
            filter = filter.search(&["name", "email"], search.as_str());
        }
        self.base.find_many(&filter).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        self.base.find_by_id(id).await
    }

    /// `email` must already be normalized
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .base
            .store()
            .find_as(collections::USERS, &Filter::new().eq("email", email))
            .await?)
    }

    pub async fn create(&self, user: &User) -> RepoResult<()> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!("email {}", user.email)));
        }
        self.base.insert(user).await?;
        Ok(())
    }

    pub async fn patch(&self, id: &str, patch: Document) -> RepoResult<User> {
        self.base.patch(id, patch).await
    }

    pub async fn set_role(&self, id: &str, role: Role) -> RepoResult<User> {
        let mut patch = Document::new();
        patch.insert("role".to_string(), json!(role.code()));
        self.base.patch(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
