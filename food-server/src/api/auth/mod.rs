//! 认证路由 (公共)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/verify", post(handler::verify))
        .route("/resend-code", post(handler::resend_code))
        .route("/login", post(handler::login))
}
