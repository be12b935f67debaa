//! 数据库连接目录服务
//!
//! 提供连接目录功能，包括：
//! - 连接记录的增删改查
//! - 连接参数连通性检查
//! - 内存或 SQLite 持久化

pub mod handlers;
pub mod probe;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

use axum::{middleware, routing::get, Json, Router};
use common::middleware::request_id::request_id_middleware;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use state::AppState;

pub const SERVICE_NAME: &str = "directory-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "连接目录服务 API",
        version = "0.1.0",
        description = "数据库连接目录微服务"
    ),
    paths(
        handlers::check_connection,
        handlers::list_connections,
        handlers::create_connection,
        handlers::update_connection,
        handlers::delete_connection,
        handlers::health_check,
    ),
    components(schemas(
        common::models::ConnectionRecord,
        common::models::Driver,
        common::models::Password,
        common::response::ApiError,
        handlers::HealthResponse,
    )),
    tags(
        (name = "connections", description = "连接目录端点"),
        (name = "health", description = "健康检查端点")
    )
)]
pub struct ApiDoc;

/// Builds the service router with its middleware stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router(&state.config.api_base_path))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
