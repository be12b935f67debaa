//! Handler模块

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use common::errors::AppError;
use common::models::ConnectionRecord;

use crate::service::DirectoryServiceTrait;
use crate::state::AppState;

/// 检查连接参数能否连通
///
/// `false` 表示检查已执行但无法建立连接。
#[utoipa::path(
    post,
    path = "/cfg/check_connection",
    tag = "connections",
    request_body = ConnectionRecord,
    responses(
        (status = 200, description = "连接检查结果", body = bool),
        (status = 400, description = "参数校验失败")
    )
)]
pub async fn check_connection(
    State(state): State<AppState>,
    payload: Result<Json<ConnectionRecord>, JsonRejection>,
) -> Result<Json<bool>, AppError> {
    let Json(record) = payload?;
    let reachable = state.service.check(record).await?;
    Ok(Json(reachable))
}

/// 列出所有已保存的数据库连接
#[utoipa::path(
    get,
    path = "/cfg/conn",
    tag = "connections",
    responses(
        (status = 200, description = "连接列表", body = Vec<ConnectionRecord>)
    )
)]
pub async fn list_connections(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConnectionRecord>>, AppError> {
    let data = state.service.list().await?;
    Ok(Json(data))
}

/// 创建新的数据库连接
#[utoipa::path(
    post,
    path = "/cfg/conn",
    tag = "connections",
    request_body = ConnectionRecord,
    responses(
        (status = 201, description = "连接已创建", body = ConnectionRecord),
        (status = 400, description = "参数校验失败"),
        (status = 409, description = "已存在等价连接")
    )
)]
pub async fn create_connection(
    State(state): State<AppState>,
    payload: Result<Json<ConnectionRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<ConnectionRecord>), AppError> {
    let Json(draft) = payload?;
    let created = state.service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 整体替换已有的数据库连接
#[utoipa::path(
    put,
    path = "/cfg/conn",
    tag = "connections",
    request_body = ConnectionRecord,
    responses(
        (status = 204, description = "连接已更新"),
        (status = 400, description = "参数校验失败"),
        (status = 404, description = "连接未找到"),
        (status = 409, description = "已存在等价连接")
    )
)]
pub async fn update_connection(
    State(state): State<AppState>,
    payload: Result<Json<ConnectionRecord>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(record) = payload?;
    state.service.update(record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 删除请求参数
#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteParams {
    /// 连接 ID
    pub db_id: String,
}

/// 根据 ID 删除数据库连接
#[utoipa::path(
    delete,
    path = "/cfg/conn",
    tag = "connections",
    params(DeleteParams),
    responses(
        (status = 204, description = "连接已删除"),
        (status = 404, description = "连接未找到")
    )
)]
pub async fn delete_connection(
    State(state): State<AppState>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(params) = params?;
    state.service.delete(&params.db_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = match state.store.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "无法统计连接数量");
            None
        }
    };

    Json(HealthResponse {
        status: if connections.is_some() { "healthy" } else { "degraded" }.to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        connections,
    })
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 已保存的连接数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<usize>,
}
