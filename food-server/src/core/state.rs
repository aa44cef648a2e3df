use std::sync::Arc;

use crate::auth::JwtService;
use crate::catalog::{CatalogLookup, StoreCatalog};
use crate::core::{BlobBackend, Config, NotifierBackend, Result, ServerError, StoreBackend};
use crate::db::repository::{
    BranchRepository, DiningTableRepository, OrderRepository, SaleRepository, UserRepository,
};
use crate::orders::{OrderPricer, OrderService};
use crate::sales::{SaleAggregator, SaleService};
use crate::services::{
    AccountService, BlobStore, LocalBlobStore, LogNotifier, Notifier, S3BlobStore, SesNotifier,
};
use crate::store::{DocumentStore, MemoryStore, StoreHandle, SurrealStore};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有依赖在构造时注入，Clone 只复制 Arc。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 文档存储 (带截止时间) |
/// | jwt_service | JWT 认证服务 |
/// | blobs | 图片存储 |
/// | notifier | 邮件发送 |
/// | accounts | 注册 / 登录 / 用户管理 |
/// | orders | 订单定价与状态 |
/// | sales | 结账 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let order = state.orders.create(payload).await?;
/// ```
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: StoreHandle,
    pub jwt_service: Arc<JwtService>,
    pub blobs: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
    pub accounts: AccountService,
    pub orders: OrderService,
    pub sales: SaleService,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 从已构造的依赖组装状态 (测试直接使用)
    pub fn from_parts(
        config: Config,
        store: StoreHandle,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        let catalog: Arc<dyn CatalogLookup> = Arc::new(StoreCatalog::new(store.clone()));
        let orders = OrderService::new(
            OrderRepository::new(store.clone()),
            BranchRepository::new(store.clone()),
            DiningTableRepository::new(store.clone()),
            OrderPricer::new(catalog),
        );
        let aggregator = SaleAggregator::new(
            OrderRepository::new(store.clone()),
            SaleRepository::new(store.clone()),
            BranchRepository::new(store.clone()),
            DiningTableRepository::new(store.clone()),
        );
        let sales = SaleService::new(SaleRepository::new(store.clone()), aggregator);
        let accounts = AccountService::new(
            UserRepository::new(store.clone()),
            BranchRepository::new(store.clone()),
            jwt_service.clone(),
            notifier.clone(),
            blobs.clone(),
        );

        Self {
            config,
            store,
            jwt_service,
            blobs,
            notifier,
            accounts,
            orders,
            sales,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (上传目录)
    /// 2. 文档存储 (SurrealDB / 内存)
    /// 3. 图片存储 (本地 / S3) 与邮件 (日志 / SES)
    pub async fn initialize(config: &Config) -> Result<Self> {
        tokio::fs::create_dir_all(config.uploads_dir()).await?;

        let backend: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data is lost on restart");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Surreal => Arc::new(
                SurrealStore::open(
                    &config.database_path,
                    &config.database_namespace,
                    &config.database_name,
                )
                .await?,
            ),
        };
        let store = StoreHandle::new(backend, config.store_timeout());

        let needs_aws = config.blob_backend == BlobBackend::S3
            || config.notifier_backend == NotifierBackend::Ses;
        let aws_config = if needs_aws {
            Some(aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await)
        } else {
            None
        };

        let blobs: Arc<dyn BlobStore> = match (&config.blob_backend, &aws_config) {
            (BlobBackend::S3, Some(aws)) => {
                let bucket = config.storage_bucket.clone().ok_or_else(|| {
                    ServerError::Config("STORAGE_BUCKET is required when BLOB_BACKEND=s3".into())
                })?;
                tracing::info!(bucket = %bucket, "Using S3 blob store");
                Arc::new(S3BlobStore::new(aws_sdk_s3::Client::new(aws), bucket))
            }
            _ => Arc::new(LocalBlobStore::new(
                config.uploads_dir(),
                format!("{}/uploads", config.public_base_url.trim_end_matches('/')),
            )),
        };

        let notifier: Arc<dyn Notifier> = match (&config.notifier_backend, &aws_config) {
            (NotifierBackend::Ses, Some(aws)) => {
                let ses_config = match &config.ses_region {
                    Some(region) => aws
                        .to_builder()
                        .region(aws_config::Region::new(region.clone()))
                        .build(),
                    None => aws.clone(),
                };
                Arc::new(SesNotifier::new(
                    aws_sdk_sesv2::Client::new(&ses_config),
                    config.ses_from_email.clone(),
                ))
            }
            _ => {
                if config.is_production() {
                    tracing::warn!("Verification emails are only logged (NOTIFIER_BACKEND=log)");
                }
                Arc::new(LogNotifier::new())
            }
        };

        tracing::info!(
            store = store.backend(),
            deadline_ms = config.store_timeout_ms,
            "Server state initialized"
        );
        Ok(Self::from_parts(config.clone(), store, blobs, notifier))
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
