//! Shared types for the nano-food backend
//!
//! Wire and domain types used by the server and any Rust client:
//! the unified error system and the entity models.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
