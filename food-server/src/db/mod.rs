//! Database Module
//!
//! 仓储层：每个集合一个仓储，均基于 [`StoreHandle`](crate::store::StoreHandle)。

pub mod repository;
