use anyhow::Context;
use common::config::{load_dotenv, AppConfig, ServiceUrls};
use gateway::{create_router, AppState, SERVICE_NAME};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);
    let service_urls = ServiceUrls::load();

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

    let state = AppState::new(config.clone(), service_urls.clone())?;
    let app = create_router(state);

    let addr = config.bind_addr();
    info!(
        service = SERVICE_NAME,
        address = %addr,
        upstream = %service_urls.directory_service,
        "启动 API 网关"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}
