//! Application state for the directory service.

use std::sync::Arc;

use common::config::AppConfig;
use common::errors::AppResult;

use crate::probe::{ConnectivityProbe, DriverProbe};
use crate::service::DirectoryService;
use crate::store::{open_store, DirectoryStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DirectoryStore>,
    pub service: DirectoryService,
}

impl AppState {
    /// Creates the state from configuration: opens the store and builds a
    /// driver-backed probe.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let store = open_store(&config).await?;
        let probe = Arc::new(DriverProbe::new(config.connect_timeout()));
        Ok(Self::with_parts(config, store, probe))
    }

    /// Creates the state from explicit parts.
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn DirectoryStore>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            service: DirectoryService::new(store.clone(), probe),
            store,
            config,
        }
    }
}
