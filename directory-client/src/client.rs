//! HTTP client for the connection directory.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use common::config::DirectoryApiConfig;
use common::models::ConnectionRecord;
use common::response::ErrorEnvelope;

use crate::error::{DirectoryError, DirectoryResult};

/// The connection directory as seen by a presentation layer.
///
/// Every call is one independent request; nothing is cached or retried.
#[async_trait]
pub trait ConnectionDirectory: Send + Sync {
    /// Asks the backend to connect with the record's parameters.
    ///
    /// `Ok(false)` means the check ran and the database could not be reached.
    /// Failing to reach the directory itself is `Err(DirectoryError::Transport)`.
    async fn check_connection(&self, record: &ConnectionRecord) -> DirectoryResult<bool>;

    /// All persisted records; empty when there are none.
    async fn list_connections(&self) -> DirectoryResult<Vec<ConnectionRecord>>;

    /// Persists a draft and returns it with its assigned id.
    async fn create_connection(&self, draft: &ConnectionRecord) -> DirectoryResult<ConnectionRecord>;

    /// Replaces the stored record with the same id.
    async fn update_connection(&self, record: &ConnectionRecord) -> DirectoryResult<()>;

    /// Removes the record with `id`. Unknown ids are `NotFound`, so deleting
    /// twice fails the second time.
    async fn delete_connection(&self, id: &str) -> DirectoryResult<()>;
}

/// [`ConnectionDirectory`] over the REST contract.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpDirectoryClient {
    /// `base_url` includes the route prefix, e.g. `http://localhost:8080/api/cfg`.
    pub fn new(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Builds a client with the configured base URL and request timeout.
    pub fn from_config(config: &DirectoryApiConfig) -> DirectoryResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(DirectoryError::Transport)?;
        Ok(Self::new(config.base_url.clone(), http_client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends the request and turns non-success answers into errors.
    async fn send(&self, request: RequestBuilder) -> DirectoryResult<Response> {
        let response = request.send().await.map_err(DirectoryError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.map_err(DirectoryError::Transport)?;
        let message = error_message(status, &body);
        tracing::debug!(status = %status, message = %message, "目录请求失败");
        Err(DirectoryError::from_status(status, message))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> DirectoryResult<T> {
        let body = response.bytes().await.map_err(DirectoryError::Transport)?;
        serde_json::from_slice(&body).map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

/// Best human-readable message from an error body.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorEnvelope { error: Some(error) }) = serde_json::from_slice(body) {
        return error.message;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        text
    }
}

#[async_trait]
impl ConnectionDirectory for HttpDirectoryClient {
    async fn check_connection(&self, record: &ConnectionRecord) -> DirectoryResult<bool> {
        let response = self
            .send(self.http_client.post(self.url("check_connection")).json(record))
            .await?;
        Self::json(response).await
    }

    async fn list_connections(&self) -> DirectoryResult<Vec<ConnectionRecord>> {
        let response = self.send(self.http_client.get(self.url("conn"))).await?;
        Self::json(response).await
    }

    async fn create_connection(&self, draft: &ConnectionRecord) -> DirectoryResult<ConnectionRecord> {
        let response = self
            .send(self.http_client.post(self.url("conn")).json(draft))
            .await?;

        let body = response.bytes().await.map_err(DirectoryError::Transport)?;
        if !body.is_empty() {
            let created: ConnectionRecord = serde_json::from_slice(&body)
                .map_err(|e| DirectoryError::Decode(e.to_string()))?;
            if created.is_persisted() {
                return Ok(created);
            }
        }

        // Backends that answer create without a body: find the stored copy.
        self.list_connections()
            .await?
            .into_iter()
            .find(|r| r.is_persisted() && r.same_target(draft))
            .ok_or_else(|| {
                DirectoryError::Decode("created record missing from directory listing".into())
            })
    }

    async fn update_connection(&self, record: &ConnectionRecord) -> DirectoryResult<()> {
        if !record.is_persisted() {
            return Err(DirectoryError::Validation("id is required on update".into()));
        }
        self.send(self.http_client.put(self.url("conn")).json(record))
            .await?;
        Ok(())
    }

    async fn delete_connection(&self, id: &str) -> DirectoryResult<()> {
        self.send(
            self.http_client
                .delete(self.url("conn"))
                .query(&[("db_id", id)]),
        )
        .await?;
        Ok(())
    }
}
