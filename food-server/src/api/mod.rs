//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 验证 / 登录
//! - [`users`] - 个人资料与用户管理
//! - [`upload`] - 图片上传
//! - [`branches`] - 门店管理
//! - [`tables`] - 桌台管理
//! - [`categories`] - 分类管理
//! - [`menus`] - 菜品管理
//! - [`add_ons`] - 加料管理
//! - [`orders`] - 订单
//! - [`sales`] - 结账

pub mod auth;
pub mod health;
pub mod upload;
pub mod users;

// Locations
pub mod branches;
pub mod tables;

// Catalog
pub mod add_ons;
pub mod categories;
pub mod menus;

// Orders & sales
pub mod orders;
pub mod sales;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};

use crate::core::ServerState;
use crate::utils::{AppError, ErrorCode};

/// `{entity} {id} not found` with the id under `key` in the details
pub(crate) fn not_found(code: ErrorCode, entity: &str, key: &str, id: &str) -> AppError {
    AppError::with_message(code, format!("{entity} {id} not found")).with_detail(key, id)
}

pub(crate) fn branch_not_found(id: &str) -> AppError {
    not_found(ErrorCode::BranchNotFound, "Branch", "branch_id", id)
}

/// Delete images no longer referenced by an entity; failures are only logged
pub(crate) async fn discard_blobs<I>(state: &ServerState, urls: I)
where
    I: IntoIterator<Item = String>,
{
    for url in urls {
        if let Err(e) = state.blobs.delete(&url).await {
            tracing::warn!(url = %url, error = %e, "Failed to delete superseded blob");
        }
    }
}
