use intranet_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// TTL and size settings of every cache, plus the sweep schedule
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.cache.validate()
    }

    pub fn addr(&self) -> SocketAddr {
        let ip = self
            .server
            .host
            .parse()
            .unwrap_or(std::net::IpAddr::from([0, 0, 0, 0]));
        SocketAddr::new(ip, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Load the demo data set into the in-memory store on startup.
    #[serde(default)]
    pub seed_demo_data: bool,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            seed_demo_data: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "intranet.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        // Built-in defaults first, so partial cache policies from a file or
        // the environment merge into complete ones.
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| format!("config defaults error: {e}"))?;
        let mut builder = Config::builder().add_source(defaults);
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }
        // Environment variable overrides, e.g., INTRANET__CACHE__USER__TTL_SECS=60
        builder = builder.add_source(
            Environment::with_prefix("INTRANET")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
