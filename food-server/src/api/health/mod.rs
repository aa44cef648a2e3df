//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 服务与存储状态 | 无 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "service": "food-server",
//!   "version": "0.1.0",
//!   "store": { "backend": "surrealdb", "status": "ok", "latency_ms": 1 }
//! }
//! ```

use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::store::{Filter, collections};

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    service: &'static str,
    version: &'static str,
    store: StoreCheck,
}

#[derive(Debug, Serialize)]
pub struct StoreCheck {
    backend: &'static str,
    /// ok | error
    status: &'static str,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// GET /health - 健康检查
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let probe = state
        .store
        .find(collections::BRANCHES, &Filter::by_id("health-probe"))
        .await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let store = match probe {
        Ok(_) => StoreCheck {
            backend: state.store.backend(),
            status: "ok",
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health probe failed");
            StoreCheck {
                backend: state.store.backend(),
                status: "error",
                latency_ms,
                error: Some(e.to_string()),
            }
        }
    };

    Json(HealthResponse {
        status: if store.error.is_none() { "ok" } else { "degraded" },
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        store,
    })
}
