//! Order Repository
//!
//! Orders are written once by the pricer and afterwards only patched through
//! [`OrderRepository::update_guarded`], whose filter includes the status the
//! caller last saw.

use std::collections::HashMap;

use serde::Deserialize;
use shared::models::{AddOn, Menu, Order, OrderQuery, OrderStatus};

use super::{BaseRepository, RepoResult};
use crate::store::{Document, Filter, Pipeline, StoreHandle, collections};

const MENU_LOOKUP: &str = "menu_lookup";
const ADD_ON_LOOKUP: &str = "add_on_lookup";

/// Order document with the joined catalog entries
#[derive(Debug, Deserialize)]
struct OrderWithLookups {
    #[serde(flatten)]
    order: Order,
    #[serde(default)]
    menu_lookup: Vec<Menu>,
    #[serde(default)]
    add_on_lookup: Vec<AddOn>,
}

impl OrderWithLookups {
    /// Attach the current catalog entry to each line and add-on
    fn embed(self) -> Order {
        let menus: HashMap<&str, &Menu> = self.menu_lookup.iter().map(|m| (m.id.as_str(), m)).collect();
        let add_ons: HashMap<&str, &AddOn> = self.add_on_lookup.iter().map(|a| (a.id.as_str(), a)).collect();

        let mut order = self.order;
        for item in &mut order.menu_items {
            item.menu_details = menus.get(item.menu_id.as_str()).map(|m| (*m).clone());
            for add_on in &mut item.add_on_items {
                add_on.add_on_details = add_ons.get(add_on.add_on_id.as_str()).map(|a| (*a).clone());
            }
        }
        order
    }
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::ORDERS),
        }
    }

    fn query_filter(query: &OrderQuery) -> Filter {
        Filter::new()
            .eq_opt("branch_id", query.branch_id.clone())
            .eq_opt("table_id", query.table_id.clone())
            .eq_opt("status", query.status.map(|s| s.as_str()))
    }

    fn detail_pipeline(filter: Filter) -> Pipeline {
        Pipeline::new()
            .matching(filter)
            .lookup(collections::MENUS, "menu_items.menu_id", "id", MENU_LOOKUP)
            .lookup(
                collections::ADD_ONS,
                "menu_items.add_on_items.add_on_id",
                "id",
                ADD_ON_LOOKUP,
            )
            .sort("created_at", true)
    }

    async fn find_detailed(&self, filter: Filter) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderWithLookups> = self
            .base
            .store()
            .aggregate_as(collections::ORDERS, &Self::detail_pipeline(filter))
            .await?;
        Ok(rows.into_iter().map(OrderWithLookups::embed).collect())
    }

    /// List orders (newest first) with current catalog details embedded
    pub async fn find_all(&self, query: &OrderQuery) -> RepoResult<Vec<Order>> {
        self.find_detailed(Self::query_filter(query)).await
    }

    /// One order with current catalog details embedded
    pub async fn find_detail(&self, id: &str) -> RepoResult<Option<Order>> {
        Ok(self.find_detailed(Filter::by_id(id)).await?.into_iter().next())
    }

    /// Stored snapshot only
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        self.base.find_by_id(id).await
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Order>> {
        self.base
            .find_many(&Filter::new().is_in("id", ids.iter().cloned()))
            .await
    }

    pub async fn insert(&self, order: &Order) -> RepoResult<String> {
        self.base.insert(order).await
    }

    /// Patch an order only if its status is still `expected`
    ///
    /// Returns the matched count: 0 means the order is gone or its status
    /// moved on since it was read.
    pub async fn update_guarded(&self, id: &str, expected: OrderStatus, mut patch: Document) -> RepoResult<u64> {
        patch.insert("updated_at".to_string(), super::now_value());
        let filter = Filter::by_id(id).eq("status", expected.as_str());
        Ok(self
            .base
            .store()
            .update(collections::ORDERS, &filter, patch)
            .await?)
    }

    /// Delete an order unless it is completed
    pub async fn delete_unless_completed(&self, id: &str) -> RepoResult<u64> {
        let filter = Filter::by_id(id).ne("status", OrderStatus::Completed.as_str());
        Ok(self
            .base
            .store()
            .delete(collections::ORDERS, &filter)
            .await?)
    }
}
