//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{DiningTable, DiningTableCreate, DiningTableQuery, DiningTableUpdate};

use crate::api::{branch_not_found, not_found};
use crate::core::ServerState;
use crate::db::repository::{BranchRepository, DiningTableRepository};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Seats per table
const MAX_SEATS: u32 = 100;

fn table_not_found(id: &str) -> AppError {
    not_found(ErrorCode::TableNotFound, "Table", "table_id", id)
}

fn validate_seats(seats: Option<u32>) -> AppResult<()> {
    match seats {
        Some(0) => Err(AppError::validation("seats must be at least 1").with_detail("field", "seats")),
        Some(n) if n > MAX_SEATS => Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("seats must be at most {MAX_SEATS}"),
        )
        .with_detail("field", "seats")),
        _ => Ok(()),
    }
}

/// GET /api/tables - 获取桌台列表 (可按门店过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DiningTableQuery>,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let repo = DiningTableRepository::new(state.store.clone());
    let tables = repo.find_all(&query).await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// GET /api/tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let repo = DiningTableRepository::new(state.store.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| table_not_found(&id))?;
    Ok(Json(ApiResponse::success(table)))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_seats(payload.seats)?;

    if !BranchRepository::new(state.store.clone())
        .exists(&payload.branch_id)
        .await?
    {
        return Err(branch_not_found(&payload.branch_id));
    }

    let repo = DiningTableRepository::new(state.store.clone());
    let table = repo.create(payload).await?;
    tracing::info!(table_id = %table.id, branch_id = %table.branch_id, "Table created");
    Ok(Json(ApiResponse::success(table)))
}

/// PUT /api/tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_seats(payload.seats)?;

    let repo = DiningTableRepository::new(state.store.clone());
    if !repo.exists(&id).await? {
        return Err(table_not_found(&id));
    }
    let table = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::success(table)))
}

/// DELETE /api/tables/{id} - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = DiningTableRepository::new(state.store.clone());
    if !repo.delete(&id).await? {
        return Err(table_not_found(&id));
    }
    tracing::info!(table_id = %id, "Table deleted");
    Ok(Json(ApiResponse::ok()))
}
