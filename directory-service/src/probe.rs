//! Connectivity checks.
//!
//! A probe opens one short-lived connection to the database a record points
//! at and reports whether that worked. Failure to connect is an answer
//! (`false`), not an error.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::IntoConnectionInfo;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use common::models::{ConnectionRecord, Driver};

/// Checks whether a record's parameters reach a live database.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self, record: &ConnectionRecord) -> bool;
}

/// Probe backed by sqlx (postgres, mysql) and redis.
pub struct DriverProbe {
    timeout: Duration,
}

impl DriverProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn try_connect(&self, record: &ConnectionRecord) -> Result<(), String> {
        let attempt = async {
            match record.driver {
                Driver::Postgres => {
                    let options = PgConnectOptions::new()
                        .host(&record.host)
                        .port(record.port)
                        .username(&record.username)
                        .password(record.password.expose())
                        .database(&record.database);
                    let conn = PgConnection::connect_with(&options)
                        .await
                        .map_err(|e| e.to_string())?;
                    conn.close().await.map_err(|e| e.to_string())
                }
                Driver::Mysql => {
                    let options = MySqlConnectOptions::new()
                        .host(&record.host)
                        .port(record.port)
                        .username(&record.username)
                        .password(record.password.expose())
                        .database(&record.database);
                    let conn = MySqlConnection::connect_with(&options)
                        .await
                        .map_err(|e| e.to_string())?;
                    conn.close().await.map_err(|e| e.to_string())
                }
                Driver::Redis => ping_redis(record).await,
            }
        };

        tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| format!("timed out after {}s", self.timeout.as_secs()))?
    }
}

async fn ping_redis(record: &ConnectionRecord) -> Result<(), String> {
    let db: i64 = record
        .database
        .parse()
        .map_err(|_| format!("redis database must be a number, got {:?}", record.database))?;

    let mut info = (record.host.as_str(), record.port)
        .into_connection_info()
        .map_err(|e| e.to_string())?;
    info.redis.db = db;
    info.redis.username = Some(record.username.clone()).filter(|u| !u.is_empty());
    info.redis.password =
        Some(record.password.expose().to_string()).filter(|p| !p.is_empty());

    let client = redis::Client::open(info).map_err(|e| e.to_string())?;
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| e.to_string())?;
    redis::cmd("PING")
        .query_async::<String>(&mut conn)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[async_trait]
impl ConnectivityProbe for DriverProbe {
    async fn probe(&self, record: &ConnectionRecord) -> bool {
        let start = Instant::now();
        match self.try_connect(record).await {
            Ok(()) => {
                tracing::info!(
                    target_db = %record.target_label(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "连接检查成功"
                );
                true
            }
            Err(reason) => {
                tracing::warn!(target_db = %record.target_label(), error = %reason, "连接检查失败");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_postgres_is_false() {
        // Port 1 on loopback is closed on any sane host.
        let probe = DriverProbe::new(Duration::from_secs(2));
        let record = ConnectionRecord::draft(Driver::Postgres, "u", "p", "127.0.0.1", 1, "app");
        assert!(!probe.probe(&record).await);
    }

    #[tokio::test]
    async fn test_redis_requires_numeric_database() {
        let probe = DriverProbe::new(Duration::from_secs(2));
        let record = ConnectionRecord::draft(Driver::Redis, "", "", "127.0.0.1", 1, "cache");
        let err = probe.try_connect(&record).await.unwrap_err();
        assert!(err.contains("must be a number"));
    }
}
