//! Add-on Repository

use chrono::Utc;
use serde_json::json;
use shared::models::{AddOn, AddOnCreate, AddOnQuery, AddOnUpdate};

use super::{BaseRepository, RepoResult, patch_of};
use crate::store::{Document, Filter, Pipeline, StoreHandle, collections};
use crate::utils::id::new_object_id;

#[derive(Debug, Clone)]
pub struct AddOnRepository {
    base: BaseRepository,
}

impl AddOnRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::ADD_ONS),
        }
    }

    /// List add-ons joined with their menu (add-ons without one are kept)
    pub async fn find_all(&self, query: &AddOnQuery) -> RepoResult<Vec<AddOn>> {
        let pipeline = Pipeline::new()
            .matching(Filter::new().eq_opt("menu_id", query.menu_id.clone()))
            .lookup(collections::MENUS, "menu_id", "id", "menu")
            .unwind("menu", true);
        Ok(self
            .base
            .store()
            .aggregate_as(collections::ADD_ONS, &pipeline)
            .await?)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<AddOn>> {
        self.base.find_by_id(id).await
    }

    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        self.base.exists(id).await
    }

    pub async fn find_by_menu(&self, menu_id: &str) -> RepoResult<Vec<AddOn>> {
        self.base
            .find_many(&Filter::new().eq("menu_id", menu_id))
            .await
    }

    pub async fn create(&self, data: AddOnCreate) -> RepoResult<AddOn> {
        let now = Utc::now();
        let add_on = AddOn {
            id: new_object_id(),
            menu_id: data.menu_id,
            title: data.title,
            description: data.description,
            price: data.price,
            is_available: data.is_available.unwrap_or(true),
            cover: data.cover,
            created_at: now,
            updated_at: now,
            menu: None,
        };
        self.base.insert(&add_on).await?;
        Ok(add_on)
    }

    pub async fn update(&self, id: &str, data: AddOnUpdate) -> RepoResult<AddOn> {
        self.base.patch(id, patch_of(&data)?).await
    }

    pub async fn set_availability(&self, id: &str, is_available: bool) -> RepoResult<AddOn> {
        let mut patch = Document::new();
        patch.insert("is_available".to_string(), json!(is_available));
        self.base.patch(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }

    /// Delete every add-on of a menu, returns the number removed
    pub async fn delete_by_menu(&self, menu_id: &str) -> RepoResult<u64> {
        Ok(self
            .base
            .store()
            .delete(collections::ADD_ONS, &Filter::new().eq("menu_id", menu_id))
            .await?)
    }
}
