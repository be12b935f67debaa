//! 连接目录服务模块

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::models::ConnectionRecord;
use common::utils::IdGenerator;

use crate::probe::ConnectivityProbe;
use crate::store::DirectoryStore;

/// 连接目录服务 Trait
#[async_trait]
pub trait DirectoryServiceTrait: Send + Sync {
    /// 检查连接参数能否连通
    async fn check(&self, record: ConnectionRecord) -> AppResult<bool>;

    /// 列出所有连接
    async fn list(&self) -> AppResult<Vec<ConnectionRecord>>;

    /// 创建新连接，返回带 id 的记录
    async fn create(&self, draft: ConnectionRecord) -> AppResult<ConnectionRecord>;

    /// 整体替换已有连接
    async fn update(&self, record: ConnectionRecord) -> AppResult<()>;

    /// 根据 ID 删除连接
    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// 数据库连接目录服务
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn DirectoryStore>,
    probe: Arc<dyn ConnectivityProbe>,
}

impl DirectoryService {
    /// 创建新的连接目录服务实例
    pub fn new(store: Arc<dyn DirectoryStore>, probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self { store, probe }
    }
}

#[async_trait]
impl DirectoryServiceTrait for DirectoryService {
    async fn check(&self, record: ConnectionRecord) -> AppResult<bool> {
        record.validate()?;
        Ok(self.probe.probe(&record).await)
    }

    async fn list(&self) -> AppResult<Vec<ConnectionRecord>> {
        self.store.list().await
    }

    async fn create(&self, draft: ConnectionRecord) -> AppResult<ConnectionRecord> {
        if draft.id.is_some() {
            return Err(AppError::Validation(
                "id is assigned by the directory and must not be set on create".into(),
            ));
        }
        draft.validate()?;

        let id = IdGenerator::connection_id();
        let record = ConnectionRecord {
            id: Some(id.clone()),
            ..draft
        };
        self.store.insert(record.clone()).await?;

        tracing::info!(id = %id, target_db = %record.target_label(), "连接已创建");
        Ok(record)
    }

    async fn update(&self, record: ConnectionRecord) -> AppResult<()> {
        if !record.is_persisted() {
            return Err(AppError::Validation("id is required on update".into()));
        }
        record.validate()?;

        let id = record.id.clone().unwrap_or_default();
        self.store.replace(record).await?;
        tracing::info!(id = %id, "连接已更新");
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        if id.trim().is_empty() {
            return Err(AppError::Validation("db_id is required".into()));
        }
        self.store.remove(id).await?;
        tracing::info!(id = %id, "连接已删除");
        Ok(())
    }
}
