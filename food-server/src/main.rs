use anyhow::Context;
use food_server::{Server, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (dotenv, 配置, 日志)
    let config = setup_environment();

    print_banner();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "🍜 Food server starting..."
    );

    // 2. 启动 HTTP 服务器 (状态在 run 中初始化)
    let port = config.http_port;
    Server::new(config)
        .run()
        .await
        .inspect_err(|e| tracing::error!("Server error: {}", e))
        .with_context(|| format!("food-server on port {port} exited with an error"))
}
