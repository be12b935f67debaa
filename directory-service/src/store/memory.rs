//! In-memory directory store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::errors::{AppError, AppResult};
use common::models::ConnectionRecord;

use super::DirectoryStore;

/// Keeps records in insertion order behind a tokio `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ConnectionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict(record: &ConnectionRecord) -> AppError {
    AppError::Conflict(record.target_label())
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<ConnectionRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn insert(&self, record: ConnectionRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(AppError::Conflict(format!(
                "duplicate id {}",
                record.id.as_deref().unwrap_or_default()
            )));
        }
        if records.iter().any(|r| r.same_target(&record)) {
            return Err(conflict(&record));
        }
        records.push(record);
        Ok(())
    }

    async fn replace(&self, record: ConnectionRecord) -> AppResult<()> {
        let mut records = self.records.write().await;

        let position = records
            .iter()
            .position(|r| r.id == record.id)
            .ok_or_else(|| AppError::ConnectionNotFound(record.id.clone().unwrap_or_default()))?;
        if records
            .iter()
            .enumerate()
            .any(|(i, r)| i != position && r.same_target(&record))
        {
            return Err(conflict(&record));
        }

        records[position] = record;
        Ok(())
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| AppError::ConnectionNotFound(id.to_string()))?;
        records.remove(position);
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Driver;

    fn record(id: &str, database: &str) -> ConnectionRecord {
        let mut r = ConnectionRecord::draft(Driver::Postgres, "u", "p", "db.local", 5432, database);
        r.id = Some(id.to_string());
        r
    }

    #[tokio::test]
    async fn test_insert_list_preserves_order() {
        let store = MemoryStore::new();
        store.insert(record("1", "a")).await.unwrap();
        store.insert(record("2", "b")).await.unwrap();

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_equivalent_conflicts() {
        let store = MemoryStore::new();
        store.insert(record("1", "a")).await.unwrap();
        let err = store.insert(record("2", "a")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_replace() {
        let store = MemoryStore::new();
        store.insert(record("1", "a")).await.unwrap();
        store.insert(record("2", "b")).await.unwrap();

        let updated = record("1", "c").with_name("renamed");
        store.replace(updated.clone()).await.unwrap();
        let list = store.list().await.unwrap();
        assert_eq!(list[0], updated);
        assert_eq!(list[1], record("2", "b"));

        // Keeping its own target is not a conflict.
        store.replace(updated.clone().with_description("d")).await.unwrap();

        let err = store.replace(record("1", "b")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = store.replace(record("9", "z")).await.unwrap_err();
        assert!(matches!(err, AppError::ConnectionNotFound(id) if id == "9"));
    }

    #[tokio::test]
    async fn test_replace_unknown_id_with_taken_target_is_not_found() {
        let store = MemoryStore::new();
        store.insert(record("1", "a")).await.unwrap();

        let err = store.replace(record("missing", "a")).await.unwrap_err();
        assert!(matches!(err, AppError::ConnectionNotFound(id) if id == "missing"));
        assert_eq!(store.list().await.unwrap(), vec![record("1", "a")]);
    }

    #[tokio::test]
    async fn test_remove_unknown_is_not_found() {
        let store = MemoryStore::new();
        store.insert(record("1", "a")).await.unwrap();
        store.remove("1").await.unwrap();

        let err = store.remove("1").await.unwrap_err();
        assert!(matches!(err, AppError::ConnectionNotFound(_)));
        assert!(store.list().await.unwrap().is_empty());
    }
}
