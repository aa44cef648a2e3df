use std::path::PathBuf;
use std::time::Duration;

use crate::auth::JwtConfig;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// 嵌入式 SurrealDB (RocksDB)
    Surreal,
    /// 进程内存储，重启即丢失
    Memory,
}

/// 图片存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    /// `WORK_DIR/uploads`，由 `/uploads` 路由提供
    Local,
    S3,
}

/// 邮件发送后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierBackend {
    /// 只写日志 (开发 / 测试)
    Log,
    Ses,
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、上传文件、日志) |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | STORE_BACKEND | surreal | surreal \| memory |
/// | DATABASE_PATH | WORK_DIR/database | SurrealDB 数据目录 |
/// | DATABASE_NAMESPACE | nano_food | SurrealDB namespace |
/// | DATABASE_NAME | nano_food | SurrealDB database |
/// | STORE_TIMEOUT_MS | 5000 | 单次存储操作截止时间 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | BLOB_BACKEND | local | local \| s3 |
/// | STORAGE_BUCKET | - | S3 bucket (BLOB_BACKEND=s3 时必填) |
/// | PUBLIC_BASE_URL | http://localhost:HTTP_PORT | 本地上传文件的外部地址 |
/// | NOTIFIER_BACKEND | log | log \| ses |
/// | SES_FROM_EMAIL | no-reply@nanofood.app | 发件人 |
/// | SES_REGION | - | 覆盖 AWS 默认 region |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 (存在时启用文件日志) |
/// | LOG_JSON | false | JSON 格式日志 |
/// | CORS_ORIGINS | * | 逗号分隔的允许来源 |
///
/// JWT 相关变量见 [`JwtConfig`]。
///
/// # 示例
///
/// ```ignore
/// STORE_BACKEND=memory HTTP_PORT=8080 cargo run -p food-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,

    // === 存储 ===
    pub store_backend: StoreBackend,
    pub database_path: String,
    pub database_namespace: String,
    pub database_name: String,
    pub store_timeout_ms: u64,
    pub request_timeout_ms: u64,

    // === 文件 ===
    pub blob_backend: BlobBackend,
    pub storage_bucket: Option<String>,
    pub public_base_url: String,

    // === 邮件 ===
    pub notifier_backend: NotifierBackend,
    pub ses_from_email: String,
    pub ses_region: Option<String>,

    // === 日志 ===
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,

    /// 空表示允许任意来源
    pub cors_origins: Vec<String>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    var(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的变量使用默认值
    pub fn from_env() -> Self {
        let work_dir = var("WORK_DIR").unwrap_or_else(|| "./data".into());
        let http_port = parse_var("HTTP_PORT", 8000);

        let store_backend = match var("STORE_BACKEND").as_deref() {
            Some("memory") => StoreBackend::Memory,
            _ => StoreBackend::Surreal,
        };
        let blob_backend = match var("BLOB_BACKEND").as_deref() {
            Some("s3") => BlobBackend::S3,
            _ => BlobBackend::Local,
        };
        let notifier_backend = match var("NOTIFIER_BACKEND").as_deref() {
            Some("ses") => NotifierBackend::Ses,
            _ => NotifierBackend::Log,
        };

        Self {
            database_path: var("DATABASE_PATH").unwrap_or_else(|| format!("{work_dir}/database")),
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{http_port}")),
            work_dir,
            http_port,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            jwt: JwtConfig::default(),

            store_backend,
            database_namespace: var("DATABASE_NAMESPACE").unwrap_or_else(|| "nano_food".into()),
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "nano_food".into()),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", 5000),
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", 30000),

            blob_backend,
            storage_bucket: var("STORAGE_BUCKET"),

            notifier_backend,
            ses_from_email: var("SES_FROM_EMAIL").unwrap_or_else(|| "no-reply@nanofood.app".into()),
            ses_region: var("SES_REGION"),

            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: var("LOG_DIR"),
            log_json: parse_var("LOG_JSON", false),

            cors_origins: var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty() && s != "*")
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// 测试用配置：内存存储、本地文件、日志邮件
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.database_path = format!("{}/database", config.work_dir);
        config.public_base_url = format!("http://localhost:{http_port}");
        config.store_backend = StoreBackend::Memory;
        config.blob_backend = BlobBackend::Local;
        config.notifier_backend = NotifierBackend::Log;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 本地上传目录
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_select_test_backends() {
        let config = Config::with_overrides("/tmp/food", 9100);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.blob_backend, BlobBackend::Local);
        assert_eq!(config.notifier_backend, NotifierBackend::Log);
        assert_eq!(config.uploads_dir(), PathBuf::from("/tmp/food/uploads"));
        assert_eq!(config.public_base_url, "http://localhost:9100");
    }
}
