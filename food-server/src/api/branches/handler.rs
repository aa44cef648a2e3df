//! Branch API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Branch, BranchCreate, BranchUpdate};

use crate::api::branch_not_found;
use crate::core::ServerState;
use crate::db::repository::BranchRepository;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppResult};

/// GET /api/branches - 获取所有门店
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Branch>>>> {
    let repo = BranchRepository::new(state.store.clone());
    let branches = repo.find_all().await?;
    Ok(Json(ApiResponse::success(branches)))
}

/// GET /api/branches/{id} - 获取单个门店
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Branch>>> {
    let repo = BranchRepository::new(state.store.clone());
    let branch = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| branch_not_found(&id))?;
    Ok(Json(ApiResponse::success(branch)))
}

/// POST /api/branches - 创建门店
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BranchCreate>,
) -> AppResult<Json<ApiResponse<Branch>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_SHORT_TEXT_LEN)?;

    let repo = BranchRepository::new(state.store.clone());
    let branch = repo.create(payload).await?;
    tracing::info!(branch_id = %branch.id, name = %branch.name, "Branch created");
    Ok(Json(ApiResponse::success(branch)))
}

/// PUT /api/branches/{id} - 更新门店
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<BranchUpdate>,
) -> AppResult<Json<ApiResponse<Branch>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_SHORT_TEXT_LEN)?;

    let repo = BranchRepository::new(state.store.clone());
    if !repo.exists(&id).await? {
        return Err(branch_not_found(&id));
    }
    let branch = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::success(branch)))
}

/// DELETE /api/branches/{id} - 删除门店
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = BranchRepository::new(state.store.clone());
    if !repo.delete(&id).await? {
        return Err(branch_not_found(&id));
    }
    tracing::info!(branch_id = %id, "Branch deleted");
    Ok(Json(ApiResponse::ok()))
}
