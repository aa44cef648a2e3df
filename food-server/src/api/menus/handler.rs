//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use shared::models::{
    AvailabilityUpdate, MAX_PRICE, Menu, MenuCreate, MenuQuery, MenuUpdate, within_bounds,
};

use crate::api::{branch_not_found, discard_blobs, not_found};
use crate::core::ServerState;
use crate::db::repository::{AddOnRepository, BranchRepository, CategoryRepository, MenuRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Gallery images per menu
const MAX_IMAGES: usize = 10;

fn menu_not_found(id: &str) -> AppError {
    not_found(ErrorCode::MenuNotFound, "Menu", "menu_id", id)
}

/// `0 <= discount <= price <= MAX_PRICE`
fn validate_pricing(price: Decimal, discount: Decimal) -> AppResult<()> {
    if !within_bounds(price, MAX_PRICE) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}"),
        )
        .with_detail("field", "price"));
    }
    if discount.is_sign_negative() || discount > price {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("discount must be between 0 and the price ({price})"),
        )
        .with_detail("field", "discount"));
    }
    Ok(())
}

fn validate_images(cover: &Option<String>, images: Option<&[String]>) -> AppResult<()> {
    validate_optional_text(cover, "cover", MAX_URL_LEN)?;
    if let Some(images) = images {
        if images.len() > MAX_IMAGES {
            return Err(AppError::validation(format!("at most {MAX_IMAGES} images per menu"))
                .with_detail("field", "images"));
        }
        for url in images {
            validate_required_text(url, "images", MAX_URL_LEN)?;
        }
    }
    Ok(())
}

/// Category must exist and belong to the branch
async fn check_category(state: &ServerState, category_id: &str, branch_id: &str) -> AppResult<()> {
    let category = CategoryRepository::new(state.store.clone())
        .find_by_id(category_id)
        .await?
        .ok_or_else(|| not_found(ErrorCode::CategoryNotFound, "Category", "category_id", category_id))?;
    if category.branch_id != branch_id {
        return Err(AppError::validation(format!(
            "Category {category_id} belongs to another branch"
        ))
        .with_detail("field", "category_id"));
    }
    Ok(())
}

/// GET /api/menus - 获取菜品列表 (branch_id / category_id / is_available / search)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<Vec<Menu>>>> {
    let repo = MenuRepository::new(state.store.clone());
    let menus = repo.find_all(&query).await?;
    Ok(Json(ApiResponse::success(menus)))
}

/// GET /api/menus/{id} - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    let repo = MenuRepository::new(state.store.clone());
    let menu = repo.find_by_id(&id).await?.ok_or_else(|| menu_not_found(&id))?;
    Ok(Json(ApiResponse::success(menu)))
}

/// POST /api/menus - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.short_title, "short_title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_pricing(payload.price, payload.discount.unwrap_or(Decimal::ZERO))?;
    validate_images(&payload.cover, payload.images.as_deref())?;

    if !BranchRepository::new(state.store.clone())
        .exists(&payload.branch_id)
        .await?
    {
        return Err(branch_not_found(&payload.branch_id));
    }
    check_category(&state, &payload.category_id, &payload.branch_id).await?;

    let repo = MenuRepository::new(state.store.clone());
    let menu = repo.create(payload).await?;
    tracing::info!(menu_id = %menu.id, title = %menu.title, price = %menu.price, "Menu created");
    Ok(Json(ApiResponse::success(menu)))
}

/// PUT /api/menus/{id} - 更新菜品
///
/// 被替换的封面和图集图片会从 blob 存储中删除。
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.short_title, "short_title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_images(&payload.cover, payload.images.as_deref())?;

    let repo = MenuRepository::new(state.store.clone());
    let existing = repo.find_by_id(&id).await?.ok_or_else(|| menu_not_found(&id))?;

    validate_pricing(
        payload.price.unwrap_or(existing.price),
        payload.discount.unwrap_or(existing.discount),
    )?;
    if let Some(category_id) = &payload.category_id
        && *category_id != existing.category_id
    {
        check_category(&state, category_id, &existing.branch_id).await?;
    }

    let menu = repo.update(&id, payload).await?;

    let mut superseded = Vec::new();
    if let Some(old) = existing.cover
        && menu.cover.as_ref() != Some(&old)
    {
        superseded.push(old);
    }
    superseded.extend(
        existing
            .images
            .into_iter()
            .filter(|url| !menu.images.contains(url)),
    );
    discard_blobs(&state, superseded).await;

    Ok(Json(ApiResponse::success(menu)))
}

/// PUT /api/menus/{id}/availability - 上架 / 下架
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AvailabilityUpdate>,
) -> AppResult<Json<ApiResponse<Menu>>> {
    let repo = MenuRepository::new(state.store.clone());
    if !repo.exists(&id).await? {
        return Err(menu_not_found(&id));
    }
    let menu = repo.set_availability(&id, payload.is_available).await?;
    tracing::info!(menu_id = %id, is_available = payload.is_available, "Menu availability changed");
    Ok(Json(ApiResponse::success(menu)))
}

/// DELETE /api/menus/{id} - 删除菜品 (连同其加料与图片)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = MenuRepository::new(state.store.clone());
    let existing = repo.find_by_id(&id).await?.ok_or_else(|| menu_not_found(&id))?;

    let add_ons = AddOnRepository::new(state.store.clone());
    let attached = add_ons.find_by_menu(&id).await?;

    if !repo.delete(&id).await? {
        return Err(menu_not_found(&id));
    }
    let removed = add_ons.delete_by_menu(&id).await?;
    tracing::info!(menu_id = %id, add_ons_removed = removed, "Menu deleted");

    let blobs = existing
        .cover
        .into_iter()
        .chain(existing.images)
        .chain(attached.into_iter().filter_map(|a| a.cover));
    discard_blobs(&state, blobs).await;

    Ok(Json(ApiResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_pricing_rules() {
        assert!(validate_pricing(d(1000), Decimal::ZERO).is_ok());
        assert!(validate_pricing(d(1000), d(1000)).is_ok());

        let err = validate_pricing(d(-100), Decimal::ZERO).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrice);

        let err = validate_pricing(d(500), d(600)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrice);
        assert_eq!(err.detail("field"), Some(&serde_json::json!("discount")));

        assert!(validate_pricing(d(500), d(-1)).is_err());
    }

    #[test]
    fn test_price_capped() {
        assert!(validate_pricing(MAX_PRICE, MAX_PRICE).is_ok());

        let err = validate_pricing(Decimal::MAX, Decimal::ZERO).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrice);
        assert_eq!(err.detail("field"), Some(&serde_json::json!("price")));
        assert!(validate_pricing(MAX_PRICE + d(1), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_gallery_limit() {
        let images = vec!["https://cdn/x.png".to_string(); MAX_IMAGES + 1];
        assert!(validate_images(&None, Some(&images)).is_err());
        assert!(validate_images(&None, Some(&images[..2])).is_ok());
    }
}
