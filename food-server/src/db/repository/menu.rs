//! Menu Repository

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use shared::models::{Menu, MenuCreate, MenuQuery, MenuUpdate};

use super::{BaseRepository, RepoResult, patch_of};
use crate::store::{Document, Filter, StoreHandle, collections};
use crate::utils::id::new_object_id;

#[derive(Debug, Clone)]
pub struct MenuRepository {
    base: BaseRepository,
}

impl MenuRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::MENUS),
        }
    }

    /// List menus; `search` is a case-insensitive title match
    pub async fn find_all(&self, query: &MenuQuery) -> RepoResult<Vec<Menu>> {
        let mut filter = Filter::new()
            .eq_opt("branch_id", query.branch_id.clone())
            .eq_opt("category_id", query.category_id.clone())
            .eq_opt("is_available", query.is_available);
        if let Some(search) = &query.search {
            filter = filter.search(&["title", "short_title"], search.as_str());
        }
        self.base.find_many(&filter).await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Menu>> {
        self.base.find_by_id(id).await
    }

    pub async fn exists(&self, id: &str) -> RepoResult<bool> {
        self.base.exists(id).await
    }

    pub async fn create(&self, data: MenuCreate) -> RepoResult<Menu> {
        let now = Utc::now();
        let menu = Menu {
            id: new_object_id(),
            branch_id: data.branch_id,
            category_id: data.category_id,
            title: data.title,
            short_title: data.short_title,
            description: data.description,
            price: data.price,
            discount: data.discount.unwrap_or(Decimal::ZERO),
            is_available: data.is_available.unwrap_or(true),
            cover: data.cover,
            images: data.images.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.base.insert(&menu).await?;
        Ok(menu)
    }

    pub async fn update(&self, id: &str, data: MenuUpdate) -> RepoResult<Menu> {
        self.base.patch(id, patch_of(&data)?).await
    }

    pub async fn set_availability(&self, id: &str, is_available: bool) -> RepoResult<Menu> {
        let mut patch = Document::new();
        patch.insert("is_available".to_string(), json!(is_available));
        self.base.patch(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
