//! Sale API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Sale, SaleCreate, SaleQuery};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/sales - 销售单列表 (branch_id / table_id)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<SaleQuery>,
) -> AppResult<Json<ApiResponse<Vec<Sale>>>> {
    let sales = state.sales.list(&query).await?;
    Ok(Json(ApiResponse::success(sales)))
}

/// GET /api/sales/{id} - 销售单详情 (含桌台信息)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = state.sales.get(&id).await?;
    Ok(Json(ApiResponse::success(sale)))
}

/// POST /api/sales - 结账
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = state.sales.create(payload).await?;
    tracing::debug!(sale_id = %sale.id, user_id = %current.id, "Sale created by user");
    Ok(Json(ApiResponse::success(sale)))
}

/// DELETE /api/sales/{id} - 删除销售单 (不会重新打开订单)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.sales.delete(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
