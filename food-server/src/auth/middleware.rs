//! 认证中间件
//!
//! 为 JWT 认证和基于角色的授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::ErrorCode;

use crate::AppError;
use crate::auth::{Action, CurrentUser, JwtError, JwtService, Resource, authorize};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a token
const PUBLIC_ROUTES: &[&str] = &[
    "/api/auth/register",
    "/api/auth/verify",
    "/api/auth/resend-code",
    "/api/auth/login",
];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health`, `/uploads/*`)
/// - 注册、验证、重发验证码、登录
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") || PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state, req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 解析 `Authorization: Bearer` 头并校验 JWT
///
/// 中间件与 [`CurrentUser`] 提取器共用；失败写入安全日志。
pub(crate) fn authenticate(
    state: &ServerState,
    headers: &http::HeaderMap,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = uri.to_string());
        return Err(AppError::unauthorized());
    };
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Expected a Bearer token"))?;

    let claims = state.jwt_service().validate_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri.to_string());
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))
}

/// 权限检查中间件 - 通过 [`authorize`] 判断角色是否满足
///
/// # 用法
///
/// ```ignore
/// Router::new()
///     .route("/api/sales", post(handler::create))
///     .layer(middleware::from_fn(require_permission(Resource::Sale, Action::Write)));
/// ```
///
/// 无权限返回 403 Forbidden
pub fn require_permission(
    resource: Resource,
    action: Action,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !authorize(user.role, resource, action) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    role = user.role.name(),
                    resource = resource.name(),
                    action = action.name()
                );
                return Err(AppError::with_message(
                    ErrorCode::PermissionDenied,
                    format!("Permission denied: {}:{}", resource.name(), action.name()),
                ));
            }

            Ok(next.run(req).await)
        })
    }
}
