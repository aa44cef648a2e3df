//! User API 模块
//!
//! `/api/users/me*` 对所有已登录用户开放；列表、改角色、删除需要用户管理权限。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::api::upload::image_body_limit;
use crate::auth::{Action, Resource, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    let self_routes = Router::new()
        .route("/me", get(handler::me).put(handler::update_me))
        .route("/me/password", put(handler::update_password))
        .route(
            "/me/avatar",
            put(handler::update_avatar).layer(image_body_limit()),
        );

    let read_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_permission(
            Resource::User,
            Action::Read,
        )));

    let manage_routes = Router::new()
        .route("/{id}/role", put(handler::set_role))
        .layer(middleware::from_fn(require_permission(
            Resource::User,
            Action::Write,
        )));

    let delete_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(
            Resource::User,
            Action::Delete,
        )));

    self_routes
        .merge(read_routes)
        .merge(manage_routes)
        .merge(delete_routes)
}
