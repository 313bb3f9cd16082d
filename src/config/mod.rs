// Configuration module entry point
// Loads layered settings and owns the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, DatabaseConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Plain environment variables honoured on top of the `APP_` prefixed ones
const WELL_KNOWN_ENV: [(&str, &str); 3] = [
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("DATABASE_NAME", "database.name"),
];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving well-known variables through `lookup`
    pub fn load_with<F>(config_path: &str, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "Energy-Management/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("database.enabled", false)?;

        for (var, key) in WELL_KNOWN_ENV {
            builder = builder.set_override_option(key, lookup(var))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
