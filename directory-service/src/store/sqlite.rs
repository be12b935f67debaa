//! SQLite-backed directory store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use common::errors::{AppError, AppResult};
use common::models::{ConnectionRecord, Driver, Password};

use super::DirectoryStore;

/// Row from the `connections` table.
#[derive(sqlx::FromRow)]
struct ConnectionRow {
    id: String,
    name: Option<String>,
    description: Option<String>,
    driver: String,
    username: String,
    password: String,
    host: String,
    port: i64,
    database_name: String,
}

impl ConnectionRow {
    fn into_record(self) -> AppResult<ConnectionRecord> {
        let driver = Driver::from_str(&self.driver).map_err(AppError::DatabaseQuery)?;
        let port = u16::try_from(self.port).map_err(|_| {
            AppError::DatabaseQuery(format!("stored port out of range: {}", self.port))
        })?;
        Ok(ConnectionRecord {
            id: Some(self.id),
            name: self.name,
            description: self.description,
            driver,
            username: self.username,
            password: Password::new(self.password),
            host: self.host,
            port,
            database: self.database_name,
        })
    }
}

/// Persists records in a `connections` table.
///
/// A unique index over `(driver, host, port, database_name, username)` rejects
/// equivalent records.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url` (e.g. `sqlite://directory.db`, `sqlite::memory:`)
    /// and creates the table if needed.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::DatabaseQuery(format!("invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true);

        // A single long-lived connection keeps `:memory:` databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseQuery(format!("failed to open store: {}", e)))?;

        let store = Self { pool };
        store.ensure_table().await?;
        Ok(store)
    }

    async fn ensure_table(&self) -> AppResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS connections (
                seq           INTEGER PRIMARY KEY AUTOINCREMENT,
                id            TEXT    NOT NULL UNIQUE,
                name          TEXT,
                description   TEXT,
                driver        TEXT    NOT NULL,
                username      TEXT    NOT NULL,
                password      TEXT    NOT NULL,
                host          TEXT    NOT NULL,
                port          INTEGER NOT NULL,
                database_name TEXT    NOT NULL,
                created_at    TEXT    NOT NULL,
                updated_at    TEXT    NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("failed to create connections table: {}", e)))?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_connections_target
             ON connections (driver, host, port, database_name, username)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("failed to create target index: {}", e)))?;

        tracing::info!("Metadata table `connections` ensured");
        Ok(())
    }
}

/// Maps unique-index violations to `Conflict`, everything else to `DatabaseQuery`.
fn write_error(record: &ConnectionRecord, action: &str, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(record.target_label())
        }
        _ => AppError::DatabaseQuery(format!("failed to {} connection: {}", action, e)),
    }
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn list(&self) -> AppResult<Vec<ConnectionRecord>> {
        let rows = sqlx::query_as::<_, ConnectionRow>(
            "SELECT id, name, description, driver, username, password, host, port, database_name
             FROM connections ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("failed to list connections: {}", e)))?;

        rows.into_iter().map(ConnectionRow::into_record).collect()
    }

    async fn insert(&self, record: ConnectionRecord) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO connections
                (id, name, description, driver, username, password, host, port, database_name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_deref())
        .bind(record.name.as_deref())
        .bind(record.description.as_deref())
        .bind(record.driver.as_str())
        .bind(&record.username)
        .bind(record.password.expose())
        .bind(&record.host)
        .bind(i64::from(record.port))
        .bind(&record.database)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(&record, "save", e))?;
        Ok(())
    }

    async fn replace(&self, record: ConnectionRecord) -> AppResult<()> {
        let id = record.id.clone().unwrap_or_default();
        let result = sqlx::query(
            "UPDATE connections
             SET name = ?, description = ?, driver = ?, username = ?, password = ?,
                 host = ?, port = ?, database_name = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(record.name.as_deref())
        .bind(record.description.as_deref())
        .bind(record.driver.as_str())
        .bind(&record.username)
        .bind(record.password.expose())
        .bind(&record.host)
        .bind(i64::from(record.port))
        .bind(&record.database)
        .bind(Utc::now().to_rfc3339())
        .bind(&id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(&record, "update", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConnectionNotFound(id));
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseQuery(format!("failed to delete connection: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConnectionNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM connections")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;
        Ok(row.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, database: &str) -> ConnectionRecord {
        let mut r = ConnectionRecord::draft(Driver::Mysql, "root", "pw", "127.0.0.1", 3306, database)
            .with_name(format!("conn {}", id));
        r.id = Some(id.to_string());
        r
    }

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_keeps_every_field() {
        let store = store().await;
        let original = record("1", "app").with_description("primary");
        store.insert(original.clone()).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![original]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_target_conflicts() {
        let store = store().await;
        store.insert(record("1", "app")).await.unwrap();

        let err = store.insert(record("2", "app")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        store.insert(record("2", "other")).await.unwrap();
        let err = store.replace(record("2", "app")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_replace_and_remove() {
        let store = store().await;
        store.insert(record("1", "app")).await.unwrap();
        store.insert(record("2", "other")).await.unwrap();

        let mut updated = record("1", "app2");
        updated.port = 3307;
        store.replace(updated.clone()).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0], updated);
        assert_eq!(listed[1], record("2", "other"));

        let err = store.replace(record("404", "x")).await.unwrap_err();
        assert!(matches!(err, AppError::ConnectionNotFound(_)));

        store.remove("1").await.unwrap();
        let err = store.remove("1").await.unwrap_err();
        assert!(matches!(err, AppError::ConnectionNotFound(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_unknown_id_with_taken_target_is_not_found() {
        let store = store().await;
        store.insert(record("1", "app")).await.unwrap();

        let err = store.replace(record("missing", "app")).await.unwrap_err();
        assert!(matches!(err, AppError::ConnectionNotFound(id) if id == "missing"));
    }
}
