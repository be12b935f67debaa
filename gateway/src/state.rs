//! Application state for gateway service.

use common::config::{AppConfig, ServiceUrls};
use common::errors::{AppError, AppResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service_urls: ServiceUrls,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig, service_urls: ServiceUrls) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(service_urls.request_timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            service_urls,
            http_client,
        })
    }
}
