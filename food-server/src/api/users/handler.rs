//! User API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use shared::models::{PasswordUpdate, RoleUpdate, UserInfo, UserInfoUpdate, UserQuery};

use crate::api::upload::read_image_form;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/users/me - 当前用户资料
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let user = state.accounts.me(&current).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /api/users/me - 更新个人资料
pub async fn update_me(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserInfoUpdate>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let user = state.accounts.update_info(&current, payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /api/users/me/password - 修改密码
pub async fn update_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<PasswordUpdate>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.update_password(&current, payload).await?;
    Ok(Json(ApiResponse::ok_with_message("Password updated")))
}

/// PUT /api/users/me/avatar - 上传头像 (multipart: file)
pub async fn update_avatar(
    State(state): State<ServerState>,
    current: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let form = read_image_form(multipart).await?;
    let user = state.accounts.update_avatar(&current, form.image).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /api/users - 用户列表 (search / role / branch_id)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserInfo>>>> {
    let users = state.accounts.list(&query).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// PUT /api/users/{id}/role - 修改用户角色
pub async fn set_role(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let user = state.accounts.set_role(&current, &id, payload.role).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// DELETE /api/users/{id} - 删除用户
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.delete(&current, &id).await?;
    Ok(Json(ApiResponse::ok()))
}
