//! Sales
//!
//! [`SaleAggregator`] settles orders into a sale; [`SaleService`] is the
//! read/delete side used by the HTTP API.

pub mod aggregator;
pub mod service;

pub use aggregator::{SaleAggregator, SettlementError, SettlementStep};
pub use service::SaleService;
