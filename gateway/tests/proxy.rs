//! Gateway forwarding against a live directory service.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use common::config::{AppConfig, ServiceUrls};
use common::models::ConnectionRecord;
use directory_service::probe::ConnectivityProbe;
use directory_service::store::MemoryStore;

struct NeverReachable;

#[async_trait]
impl ConnectivityProbe for NeverReachable {
    async fn probe(&self, _record: &ConnectionRecord) -> bool {
        false
    }
}

async fn spawn_directory() -> String {
    let state = directory_service::AppState::with_parts(
        AppConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(NeverReachable),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, directory_service::create_router(state))
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

fn gateway(upstream: String) -> Router {
    let config = AppConfig {
        service_name: gateway::SERVICE_NAME.to_string(),
        ..AppConfig::default()
    };
    let urls = ServiceUrls {
        directory_service: upstream,
        request_timeout_secs: 5,
    };
    gateway::create_router(gateway::AppState::new(config, urls).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-request-id", "gw-test");
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    assert_eq!(response.headers()["x-request-id"], "gw-test");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn draft() -> Value {
    json!({
        "driver": "mysql",
        "username": "root",
        "password": "",
        "host": "10.0.0.5",
        "port": 3306,
        "database": "sales"
    })
}

#[tokio::test]
async fn api_prefix_is_forwarded_to_directory() {
    let app = gateway(spawn_directory().await);

    let (status, created) = send(&app, Method::POST, "/api/cfg/conn", Some(draft())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, Method::GET, "/api/cfg/conn", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created]));

    let (status, checked) =
        send(&app, Method::POST, "/api/cfg/check_connection", Some(draft())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checked, json!(false));

    let uri = format!("/api/cfg/conn?db_id={}", id);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn aggregated_health_sees_directory() {
    let app = gateway(spawn_directory().await);
    let (status, body) = send(&app, Method::GET, "/api/health/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"][0]["name"], "directory-service");

    let (_, own) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(own["service"], "gateway");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let app = gateway(format!("http://{}", addr));

    let (status, body) = send(&app, Method::GET, "/api/cfg/conn", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_ERROR");

    let (_, health) = send(&app, Method::GET, "/api/health/all", None).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["services"][0]["healthy"], false);
}
