//! 服务模块
//!
//! - [`account`] - 注册、验证、登录、用户管理
//! - [`blob`] - 图片存储 (本地 / S3)
//! - [`credential`] - Argon2 凭证校验
//! - [`https`] - HTTP 路由与中间件
//! - [`image`] - 上传图片校验
//! - [`notifier`] - 邮件发送 (日志 / SES)

pub mod account;
pub mod blob;
pub mod credential;
pub mod https;
pub mod image;
pub mod notifier;

pub use account::AccountService;
pub use blob::{BlobError, BlobStore, LocalBlobStore, S3BlobStore};
pub use credential::CredentialVerifier;
pub use https::{build_app, build_router};
pub use image::ImageFile;
pub use notifier::{LogNotifier, Notifier, NotifyError, SesNotifier};
