//! 请求转发模块
//!
//! `/api/{path}` 转发到目录服务的 `/{path}`，保留方法、查询串、请求体与请求 ID。

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderMap, Method, Uri,
    },
    response::Response,
    routing::any,
    Extension, Router,
};

use common::errors::{AppError, AppResult};
use common::middleware::{RequestId, REQUEST_ID_HEADER};

use crate::state::AppState;

/// 创建转发路由
pub fn router() -> Router<AppState> {
    Router::new().route("/api/{*path}", any(forward))
}

/// Upstream URL for a gateway path and optional query string.
pub fn upstream_url(base: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Extension(request_id): Extension<RequestId>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let url = upstream_url(&state.service_urls.directory_service, &path, uri.query());
    tracing::debug!(method = %method, upstream = %url, "转发请求");

    let mut request = state
        .http_client
        .request(method, &url)
        .header(REQUEST_ID_HEADER.clone(), request_id.as_str());
    for name in [CONTENT_TYPE, ACCEPT] {
        if let Some(value) = headers.get(&name) {
            request = request.header(name, value.clone());
        }
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("无法连接到目录服务: {}", e)))?;

    let status = upstream.status();
    let mut builder = Response::builder().status(status);
    if let Some(content_type) = upstream.headers().get(CONTENT_TYPE) {
        builder = builder.header(CONTENT_TYPE, content_type.clone());
    }
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| AppError::ExternalService(format!("目录服务响应读取失败: {}", e)))?;

    builder
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url() {
        assert_eq!(
            upstream_url("http://dir:8081", "cfg/conn", None),
            "http://dir:8081/cfg/conn"
        );
        assert_eq!(
            upstream_url("http://dir:8081/", "cfg/conn", Some("db_id=abc")),
            "http://dir:8081/cfg/conn?db_id=abc"
        );
        assert_eq!(
            upstream_url("http://dir:8081", "health", Some("")),
            "http://dir:8081/health"
        );
    }
}
