//! 统一错误体系
//!
//! 错误码按千位分组 (见 [`ErrorCategory`])：0 通用、1 认证、2 权限、3 账户、
//! 4 订单、5 结账、6 菜单目录、7 门店/餐桌、8 用户、9 系统。
//! [`AppError`] 是唯一跨越 HTTP 边界的错误类型，[`ApiResponse`] 为统一响应体。
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", "O2");
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(4001));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
