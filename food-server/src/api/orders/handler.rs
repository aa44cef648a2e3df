//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Order, OrderCreate, OrderQuery, OrderUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/orders - 订单列表 (branch_id / table_id / status)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders.list(&query).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/orders/{id} - 订单详情 (含菜品 / 加料信息)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get(&id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /api/orders - 下单
///
/// 价格由服务端按当前菜单计算并快照到订单中。
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.create(payload).await?;
    tracing::debug!(order_id = %order.id, user_id = %current.id, "Order placed");
    Ok(Json(ApiResponse::success(order)))
}

/// PUT /api/orders/{id} - 更新订单 (状态 / 备注 / 支付标记)
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.update(&id, payload).await?;
    tracing::debug!(order_id = %id, user_id = %current.id, status = order.status.as_str(), "Order updated");
    Ok(Json(ApiResponse::success(order)))
}

/// DELETE /api/orders/{id} - 删除订单 (已完成的订单不可删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.orders.delete(&id).await?;
    Ok(Json(ApiResponse::ok()))
}
