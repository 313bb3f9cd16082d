// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access/info log file path (None = stdout)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (None = stderr)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Document store settings
///
/// `enabled` says whether the database module is installed at all;
/// `url` and `name` are the connection settings it needs to initialize.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// `DATABASE_URL` is present and non-empty
    pub fn url_is_set(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// `DATABASE_NAME` is present and non-empty
    pub fn name_is_set(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}
