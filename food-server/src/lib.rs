//! Food Server - 餐厅点单与结账后端
//!
//! # 架构概述
//!
//! - **目录** (`catalog`): 菜品 / 加料的价格与可售状态查询
//! - **订单** (`orders`): 计价、状态机、订单服务
//! - **结账** (`sales`): 多订单汇总为销售单，逐单 compare-and-set + 补偿
//! - **存储** (`store`): 文档存储抽象 (内存 / 嵌入式 SurrealDB)，所有调用带截止时间
//! - **认证** (`auth`): JWT + Argon2，统一的角色策略
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! food-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT 认证、权限策略
//! ├── services/      # 账户、图片存储、邮件、HTTP 组装
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 价格查询
//! ├── orders/        # 计价与订单状态
//! ├── sales/         # 结账聚合
//! ├── db/            # 仓储层
//! ├── store/         # 文档存储
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod sales;
pub mod services;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderPricer;
pub use sales::SaleAggregator;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 `.env`、读取配置并初始化日志
pub fn setup_environment() -> Config {
    // .env is optional
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    config
}

pub fn print_banner() {
    println!(
        r#"
    ______                __
   / ____/___  ____  ____/ /
  / /_  / __ \/ __ \/ __  /
 / __/ / /_/ / /_/ / /_/ /
/_/    \____/\____/\__,_/
    "#
    );
}
