//! Sale Repository

use shared::models::{Sale, SaleQuery};

use super::{BaseRepository, RepoResult};
use crate::store::{Filter, Pipeline, StoreHandle, collections};

#[derive(Debug, Clone)]
pub struct SaleRepository {
    base: BaseRepository,
}

impl SaleRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            base: BaseRepository::new(store, collections::SALES),
        }
    }

    fn joined(filter: Filter) -> Pipeline {
        Pipeline::new()
            .matching(filter)
            .lookup(collections::TABLES, "table_id", "id", "table_details")
            .unwind("table_details", true)
            .sort("created_at", true)
    }

    /// List sales (newest first) with their table
    pub async fn find_all(&self, query: &SaleQuery) -> RepoResult<Vec<Sale>> {
        let filter = Filter::new()
            .eq_opt("branch_id", query.branch_id.clone())
            .eq_opt("table_id", query.table_id.clone());
        Ok(self
            .base
            .store()
            .aggregate_as(collections::SALES, &Self::joined(filter))
            .await?)
    }

    pub async fn find_detail(&self, id: &str) -> RepoResult<Option<Sale>> {
        let mut sales: Vec<Sale> = self
            .base
            .store()
            .aggregate_as(collections::SALES, &Self::joined(Filter::by_id(id)))
            .await?;
        Ok(sales.pop())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Sale>> {
        self.base.find_by_id(id).await
    }

    pub async fn insert(&self, sale: &Sale) -> RepoResult<String> {
        self.base.insert(sale).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
