//! API 网关服务
//!
//! 作为前端请求的入口点，提供以下功能：
//! - `/api/*` 请求转发到连接目录服务
//! - 网关与下游服务健康检查
//! - 请求 ID 与访问日志

pub mod proxy;
pub mod routes;
pub mod state;

use axum::{middleware, routing::get, Json, Router};
use common::middleware::request_id::request_id_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use state::AppState;

pub const SERVICE_NAME: &str = "gateway";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "连接目录 API 网关",
        version = "0.1.0",
        description = "转发 /api/* 到连接目录服务"
    ),
    paths(
        routes::health_check,
        routes::aggregated_health,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::AggregatedHealth,
        routes::ServiceHealth,
    )),
    tags(
        (name = "health", description = "健康检查端点")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .merge(proxy::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
