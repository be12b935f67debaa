//! 连接目录路由模块

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// 连接目录路由（挂载在配置的前缀下，默认 `/cfg`）
pub fn directory_router() -> Router<AppState> {
    Router::new()
        .route("/check_connection", post(handlers::check_connection))
        .route(
            "/conn",
            get(handlers::list_connections)
                .post(handlers::create_connection)
                .put(handlers::update_connection)
                .delete(handlers::delete_connection),
        )
}

/// 创建完整路由：目录路由加前缀，健康检查在根路径
pub fn router(base_path: &str) -> Router<AppState> {
    let root = Router::new().route("/health", get(handlers::health_check));
    if base_path.is_empty() {
        root.merge(directory_router())
    } else {
        root.nest(base_path, directory_router())
    }
}
