//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务 (身份断言)
//! - [`CurrentUser`] - 当前用户上下文
//! - [`authorize`] - 统一的角色策略检查
//! - [`require_auth`] - 认证中间件
//! - [`require_permission`] - 权限检查中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod policy;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_permission};
pub use policy::{Action, Resource, authorize};
