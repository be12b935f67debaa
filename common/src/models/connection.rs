//! Connection record models.
//!
//! A `ConnectionRecord` is both the draft a user fills in and the persisted
//! entry of the directory; the only difference is whether `id` is set.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Database engine a record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// PostgreSQL database.
    #[serde(alias = "Postgres", alias = "postgresql")]
    Postgres,
    /// MySQL database.
    #[serde(alias = "Mysql", alias = "MySQL")]
    Mysql,
    /// Redis key-value store.
    #[serde(alias = "Redis")]
    Redis,
}

impl Driver {
    /// Returns the default port for this driver.
    pub fn default_port(&self) -> u16 {
        match self {
            Driver::Postgres => 5432,
            Driver::Mysql => 3306,
            Driver::Redis => 6379,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::Mysql => "mysql",
            Driver::Redis => "redis",
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "mysql" => Ok(Driver::Mysql),
            "redis" => Ok(Driver::Redis),
            other => Err(format!("unknown driver: {}", other)),
        }
    }
}

/// Database password.
///
/// Travels in cleartext on the wire, but never shows up in `Debug` output,
/// so records can be logged safely.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Password)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the cleartext password.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One configured database connection.
///
/// JSON body example:
/// ```json
/// {
///     "driver": "postgres",
///     "username": "u",
///     "password": "p",
///     "host": "db.local",
///     "port": 5432,
///     "database": "app"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConnectionRecord {
    /// Stable identifier, assigned by the directory on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Database engine.
    pub driver: Driver,
    /// Login user.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Login password; may be empty for trust-authenticated servers.
    pub password: Password,
    /// Server host name or address.
    #[validate(length(min = 1, message = "host is required"))]
    pub host: String,
    /// Server port.
    #[validate(range(min = 1, message = "port must be between 1 and 65535"))]
    pub port: u16,
    /// Target database (schema/catalog, or db index for redis).
    #[validate(length(min = 1, message = "database is required"))]
    pub database: String,
}

impl ConnectionRecord {
    /// Creates a draft (no id) with the required fields.
    pub fn draft(
        driver: Driver,
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            driver,
            username: username.into(),
            password: Password::new(password),
            host: host.into(),
            port,
            database: database.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True once the directory has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Whether both records point at the same login on the same database.
    ///
    /// Two such records may not coexist in a directory.
    pub fn same_target(&self, other: &ConnectionRecord) -> bool {
        self.driver == other.driver
            && self.host == other.host
            && self.port == other.port
            && self.database == other.database
            && self.username == other.username
    }

    /// `driver://username@host:port/database`, without the password.
    pub fn target_label(&self) -> String {
        format!(
            "{}://{}@{}:{}/{}",
            self.driver, self.username, self.host, self.port, self.database
        )
    }
}
