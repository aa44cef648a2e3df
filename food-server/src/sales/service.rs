//! Sale Service

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Sale, SaleCreate, SaleQuery};

use super::aggregator::SaleAggregator;
use crate::db::repository::SaleRepository;

#[derive(Debug, Clone)]
pub struct SaleService {
    sales: SaleRepository,
    aggregator: SaleAggregator,
}

fn sale_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::SaleNotFound, format!("Sale {id} not found"))
        .with_detail("sale_id", id)
}

impl SaleService {
    pub fn new(sales: SaleRepository, aggregator: SaleAggregator) -> Self {
        Self { sales, aggregator }
    }

    pub async fn create(&self, payload: SaleCreate) -> AppResult<Sale> {
        Ok(self.aggregator.settle(payload).await?)
    }

    pub async fn list(&self, query: &SaleQuery) -> AppResult<Vec<Sale>> {
        Ok(self.sales.find_all(query).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Sale> {
        self.sales
            .find_detail(id)
            .await?
            .ok_or_else(|| sale_not_found(id))
    }

    /// Delete a sale record; the settled orders stay completed
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.sales.delete(id).await? {
            return Err(sale_not_found(id));
        }
        tracing::info!(sale_id = %id, "Sale deleted");
        Ok(())
    }
}
