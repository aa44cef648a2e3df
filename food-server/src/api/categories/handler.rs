//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Category, CategoryCreate, CategoryQuery, CategoryUpdate};

use crate::api::{branch_not_found, not_found};
use crate::core::ServerState;
use crate::db::repository::{BranchRepository, CategoryRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn category_not_found(id: &str) -> AppError {
    not_found(ErrorCode::CategoryNotFound, "Category", "category_id", id)
}

/// GET /api/categories - 获取分类列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let repo = CategoryRepository::new(state.store.clone());
    let categories = repo.find_all(&query).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /api/categories/{id} - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let repo = CategoryRepository::new(state.store.clone());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| category_not_found(&id))?;
    Ok(Json(ApiResponse::success(category)))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    if !BranchRepository::new(state.store.clone())
        .exists(&payload.branch_id)
        .await?
    {
        return Err(branch_not_found(&payload.branch_id));
    }

    let repo = CategoryRepository::new(state.store.clone());
    let category = repo.create(payload).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// PUT /api/categories/{id} - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let repo = CategoryRepository::new(state.store.clone());
    if !repo.exists(&id).await? {
        return Err(category_not_found(&id));
    }
    let category = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// DELETE /api/categories/{id} - 删除分类
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = CategoryRepository::new(state.store.clone());
    if !repo.delete(&id).await? {
        return Err(category_not_found(&id));
    }
    Ok(Json(ApiResponse::ok()))
}
