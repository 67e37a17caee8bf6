use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Storage connection string: `memory://`, `redb://<path>` or a bare path
    #[serde(default = "default_storage_uri")]
    pub storage_uri: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            storage_uri: default_storage_uri(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment files, config files and
    /// environment variables.
    ///
    /// Later sources win:
    /// 1. built-in defaults
    /// 2. `server.{toml,yaml,json}` in the working directory
    /// 3. `PRODUCT_SERVER__*` variables
    /// 4. plain `PORT` and `STORAGE_URI` (`MONGO_URI` is accepted as a legacy alias)
    ///
    /// `config.env` and `.env` are loaded into the process environment first.
    pub fn load() -> anyhow::Result<Self> {
        // Missing env files are fine; the process environment still applies.
        let _ = dotenvy::from_filename("config.env");
        let _ = dotenvy::dotenv();

        let storage_uri = std::env::var("STORAGE_URI")
            .or_else(|_| std::env::var("MONGO_URI"))
            .ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("PRODUCT_SERVER").separator("__"))
            .set_override_option("port", std::env::var("PORT").ok())?
            .set_override_option("storage_uri", storage_uri)?;

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_storage_uri() -> String {
    "products.redb".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
