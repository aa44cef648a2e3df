//! 启动 / 运行期错误
//!
//! 请求级错误统一使用 [`AppError`](crate::AppError)；这里只覆盖
//! 进程启动和监听阶段的失败。

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储初始化失败: {0}")]
    Store(#[from] StoreError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
