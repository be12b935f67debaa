use anyhow::Context;
use common::config::{load_dotenv, AppConfig};
use directory_service::{create_router, AppState, SERVICE_NAME};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_PORT: u16 = 8081;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if present) before anything else
    load_dotenv();

    // 加载配置
    let mut config = AppConfig::load_with_service(SERVICE_NAME);
    if std::env::var("SERVER_PORT").is_err() {
        config.port = DEFAULT_PORT;
    }

    // 初始化日志追踪
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if config.json_logs {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }

    // 创建应用状态（连接目录存储）
    let state = AppState::new(config.clone())
        .await
        .context("failed to initialize connection directory store (check DATABASE_URL)")?;

    let app = create_router(state);

    let addr = config.bind_addr();
    info!(
        service = SERVICE_NAME,
        address = %addr,
        base_path = %config.api_base_path,
        "启动服务"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}
