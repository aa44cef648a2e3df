//! Add-on API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use shared::models::{
    AddOn, AddOnCreate, AddOnQuery, AddOnUpdate, AvailabilityUpdate, MAX_PRICE, within_bounds,
};

use crate::api::{discard_blobs, not_found};
use crate::core::ServerState;
use crate::db::repository::{AddOnRepository, MenuRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn add_on_not_found(id: &str) -> AppError {
    not_found(ErrorCode::AddOnNotFound, "Add-on", "add_on_id", id)
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if !within_bounds(price, MAX_PRICE) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}"),
        )
        .with_detail("field", "price"));
    }
    Ok(())
}

async fn check_menu(state: &ServerState, menu_id: &str) -> AppResult<()> {
    if !MenuRepository::new(state.store.clone()).exists(menu_id).await? {
        return Err(not_found(ErrorCode::MenuNotFound, "Menu", "menu_id", menu_id));
    }
    Ok(())
}

/// GET /api/add-ons - 获取加料列表 (可按菜品过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AddOnQuery>,
) -> AppResult<Json<ApiResponse<Vec<AddOn>>>> {
    let repo = AddOnRepository::new(state.store.clone());
    let add_ons = repo.find_all(&query).await?;
    Ok(Json(ApiResponse::success(add_ons)))
}

/// GET /api/add-ons/{id} - 获取单个加料
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AddOn>>> {
    let repo = AddOnRepository::new(state.store.clone());
    let add_on = repo.find_by_id(&id).await?.ok_or_else(|| add_on_not_found(&id))?;
    Ok(Json(ApiResponse::success(add_on)))
}

/// POST /api/add-ons - 创建加料
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AddOnCreate>,
) -> AppResult<Json<ApiResponse<AddOn>>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.cover, "cover", MAX_URL_LEN)?;
    validate_price(payload.price)?;
    if let Some(menu_id) = &payload.menu_id {
        check_menu(&state, menu_id).await?;
    }

    let repo = AddOnRepository::new(state.store.clone());
    let add_on = repo.create(payload).await?;
    tracing::info!(add_on_id = %add_on.id, title = %add_on.title, price = %add_on.price, "Add-on created");
    Ok(Json(ApiResponse::success(add_on)))
}

/// PUT /api/add-ons/{id} - 更新加料
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AddOnUpdate>,
) -> AppResult<Json<ApiResponse<AddOn>>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.cover, "cover", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    let repo = AddOnRepository::new(state.store.clone());
    let existing = repo.find_by_id(&id).await?.ok_or_else(|| add_on_not_found(&id))?;
    if let Some(menu_id) = &payload.menu_id {
        check_menu(&state, menu_id).await?;
    }

    let add_on = repo.update(&id, payload).await?;
    if let Some(old) = existing.cover
        && add_on.cover.as_ref() != Some(&old)
    {
        discard_blobs(&state, [old]).await;
    }
    Ok(Json(ApiResponse::success(add_on)))
}

/// PUT /api/add-ons/{id}/availability - 上架 / 下架
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AvailabilityUpdate>,
) -> AppResult<Json<ApiResponse<AddOn>>> {
    let repo = AddOnRepository::new(state.store.clone());
    if !repo.exists(&id).await? {
        return Err(add_on_not_found(&id));
    }
    let add_on = repo.set_availability(&id, payload.is_available).await?;
    Ok(Json(ApiResponse::success(add_on)))
}

/// DELETE /api/add-ons/{id} - 删除加料
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = AddOnRepository::new(state.store.clone());
    let existing = repo.find_by_id(&id).await?.ok_or_else(|| add_on_not_found(&id))?;
    if !repo.delete(&id).await? {
        return Err(add_on_not_found(&id));
    }
    discard_blobs(&state, existing.cover).await;
    Ok(Json(ApiResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_bounds() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(Decimal::new(-1, 2)).is_err());

        let err = validate_price(Decimal::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrice);
        assert_eq!(err.detail("field"), Some(&serde_json::json!("price")));
    }
}
