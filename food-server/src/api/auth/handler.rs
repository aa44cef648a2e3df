//! Auth API Handlers

use axum::{Json, extract::State};
use shared::models::{
    LoginRequest, LoginResponse, RegisterRequest, ResendCodeRequest, UserInfo, VerifyRequest,
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// POST /api/auth/register - 注册并发送验证码
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let user = state.accounts.register(payload).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Verification code sent",
        user,
    )))
}

/// POST /api/auth/verify - 验证邮箱
pub async fn verify(
    State(state): State<ServerState>,
    Json(payload): Json<VerifyRequest>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let user = state.accounts.verify(payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /api/auth/resend-code - 重新发送验证码
pub async fn resend_code(
    State(state): State<ServerState>,
    Json(payload): Json<ResendCodeRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.resend_code(payload).await?;
    Ok(Json(ApiResponse::ok_with_message("Verification code sent")))
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let response = state.accounts.login(payload).await?;
    Ok(Json(ApiResponse::success(response)))
}
