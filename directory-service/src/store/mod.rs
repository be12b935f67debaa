//! Connection record persistence.
//!
//! A store owns the directory: it keeps ids unique, refuses two records with
//! the same target (see [`ConnectionRecord::same_target`]) and reports unknown
//! ids as `ConnectionNotFound`. Equivalence is checked in the same critical
//! section as the write.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use common::config::AppConfig;
use common::errors::AppResult;
use common::models::ConnectionRecord;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Backing storage of the connection directory.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All records, oldest first.
    async fn list(&self) -> AppResult<Vec<ConnectionRecord>>;

    /// Stores a record whose `id` is already assigned.
    async fn insert(&self, record: ConnectionRecord) -> AppResult<()>;

    /// Replaces the record with the same `id`.
    async fn replace(&self, record: ConnectionRecord) -> AppResult<()>;

    /// Removes the record with `id`.
    async fn remove(&self, id: &str) -> AppResult<()>;

    /// Number of stored records.
    async fn count(&self) -> AppResult<usize> {
        Ok(self.list().await?.len())
    }
}

/// Opens the store selected by `DATABASE_URL`: sqlite when set, memory otherwise.
pub async fn open_store(config: &AppConfig) -> AppResult<Arc<dyn DirectoryStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = SqliteStore::connect(url).await?;
            tracing::info!(url = %url, "使用 SQLite 连接目录存储");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("未配置 DATABASE_URL，使用内存连接目录存储");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
