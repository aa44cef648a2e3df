//! Upload API Handlers

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use super::read_image_form;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::account::AVATAR_FOLDER;
use crate::utils::{ApiResponse, AppError, AppResult};

/// Folders an upload may target
pub const UPLOAD_FOLDERS: &[&str] = &["menu_covers", "menu_images", "add_on_covers", AVATAR_FOLDER];

const DEFAULT_FOLDER: &str = "menu_images";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub folder: String,
    pub original_name: String,
    pub size: usize,
    pub content_type: String,
}

/// POST /api/uploads - 上传图片 (multipart: file, folder)
pub async fn upload(
    State(state): State<ServerState>,
    current: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let form = read_image_form(multipart).await?;
    let folder = form.folder.unwrap_or_else(|| DEFAULT_FOLDER.to_string());
    if !UPLOAD_FOLDERS.contains(&folder.as_str()) {
        return Err(AppError::validation(format!(
            "Unknown upload folder '{folder}'. Allowed: {}",
            UPLOAD_FOLDERS.join(", ")
        ))
        .with_detail("field", "folder"));
    }

    let image = form.image;
    let size = image.bytes.len();
    let url = state
        .blobs
        .put(&folder, &image.extension, image.bytes, &image.content_type)
        .await?;

    tracing::info!(
        user_id = %current.id,
        original_name = %image.original_name,
        size,
        url = %url,
        "Image uploaded"
    );

    Ok(Json(ApiResponse::success(UploadResponse {
        url,
        folder,
        original_name: image.original_name,
        size,
        content_type: image.content_type,
    })))
}
