use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;

use crate::auth::require_auth;
use crate::core::{BlobBackend, ServerState};
use crate::utils::AppError;

/// HTTP 请求日志中间件
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", request_id = %request_id, "{} {} {}", method, uri, response.status());

    response
}

/// 请求超时中间件
///
/// 超时后丢弃处理 future，进行中的存储调用随之取消。
async fn request_timeout(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let limit = state.config.request_timeout();
    let uri = request.uri().clone();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(uri = %uri, timeout_ms = limit.as_millis() as u64, "Request timed out");
            AppError::timeout(format!("Request did not complete in {}ms", limit.as_millis()))
                .with_detail("retriable", true)
                .into_response()
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::users::router())
        .merge(crate::api::upload::router())
        // Locations
        .merge(crate::api::branches::router())
        .merge(crate::api::tables::router())
        // Catalog
        .merge(crate::api::categories::router())
        .merge(crate::api::menus::router())
        .merge(crate::api::add_ons::router())
        // Orders & sales
        .merge(crate::api::orders::router())
        .merge(crate::api::sales::router())
}

/// Full application: routes, auth, static uploads and Tower middleware
pub fn build_router(state: ServerState) -> Router {
    let mut app = build_app();
    if state.config.blob_backend == BlobBackend::Local {
        app = app.nest_service("/uploads", ServeDir::new(state.config.uploads_dir()));
    }

    app
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn_with_state(state.clone(), request_timeout))
        .with_state(state.clone())
        // Tower HTTP 中间件 (自上而下由外到内)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(log_request))
                .layer(CompressionLayer::new())
                .layer(cors_layer(&state.config.cors_origins)),
        )
}
