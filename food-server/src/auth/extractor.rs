//! CurrentUser extractor
//!
//! Handlers take `CurrentUser` as an argument; the value is normally put in
//! the request extensions by [`require_auth`](super::require_auth).

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::authenticate;
use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        // 路由未挂 require_auth 时 (例如测试中的单独 Router) 自行校验
        let user = authenticate(state, &parts.headers, &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
