//! Service configuration.
//!
//! All settings come from environment variables; a `.env` file in the working
//! directory is read first without overriding variables that are already set.

use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_BASE_PATH: &str = "/cfg";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DIRECTORY_SERVICE_URL: &str = "http://127.0.0.1:8081";
const DEFAULT_DIRECTORY_API_URL: &str = "http://127.0.0.1:8080/api/cfg";

/// Settings shared by the HTTP services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name used in logs and envelopes.
    pub service_name: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Path prefix of the connection directory routes (`/cfg`, `/api/cfg`, ...).
    pub api_base_path: String,
    /// Metadata store URL. `None` keeps the directory in memory.
    pub database_url: Option<String>,
    /// Upper bound for one connectivity probe.
    pub connect_timeout_secs: u64,
    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,
}

impl AppConfig {
    /// Loads the configuration for the named service.
    pub fn load_with_service(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            host: env_or("SERVER_HOST", DEFAULT_HOST),
            port: env_parse("SERVER_PORT").unwrap_or(DEFAULT_PORT),
            api_base_path: normalize_base_path(&env_or("API_BASE_PATH", DEFAULT_API_BASE_PATH)),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Connectivity probe timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "directory-service".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_base_path: DEFAULT_API_BASE_PATH.to_string(),
            database_url: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            json_logs: false,
        }
    }
}

/// Upstream service locations used by the gateway.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    pub directory_service: String,
    /// Per-request timeout for upstream calls.
    pub request_timeout_secs: u64,
}

impl ServiceUrls {
    pub fn load() -> Self {
        Self {
            directory_service: env_or("DIRECTORY_SERVICE_URL", DEFAULT_DIRECTORY_SERVICE_URL)
                .trim_end_matches('/')
                .to_string(),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where a client reaches the connection directory API.
#[derive(Debug, Clone)]
pub struct DirectoryApiConfig {
    /// Full base URL including the route prefix, e.g. `http://host:8080/api/cfg`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl DirectoryApiConfig {
    pub fn load() -> Self {
        Self {
            base_url: env_or("DIRECTORY_API_URL", DEFAULT_DIRECTORY_API_URL),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Normalizes a route prefix to `/segment[/segment]` form; blank means root.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
pub fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set by the environment
        if std::env::var(&key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/cfg"), "/cfg");
        assert_eq!(normalize_base_path("cfg/"), "/cfg");
        assert_eq!(normalize_base_path("/api/cfg/"), "/api/cfg");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("  "), "");
    }

    #[test]
    fn test_parse_dotenv_skips_comments() {
        let parsed = parse_dotenv("# comment\n\nSERVER_PORT = 9000\nDATABASE_URL=\"sqlite::memory:\"\nnot a pair\n");
        assert_eq!(
            parsed,
            vec![
                ("SERVER_PORT".to_string(), "9000".to_string()),
                ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_path, "/cfg");
        assert!(config.database_url.is_none());
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_upstream_timeout() {
        let urls = ServiceUrls {
            directory_service: "http://127.0.0.1:8081".into(),
            request_timeout_secs: 12,
        };
        assert_eq!(urls.request_timeout(), Duration::from_secs(12));
    }
}
