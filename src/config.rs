use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::connection::DEFAULT_MAX_BODY_BYTES;

/// Environment variable naming an optional YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "RESTGATE_CONFIG";

/// Environment variable overriding the bind address.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    /// Deadline for each controller call, in milliseconds
    pub invoke_timeout_ms: Option<u64>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            invoke_timeout_ms: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Loads the file named by `RESTGATE_CONFIG` if set, then applies the
    /// `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn invoke_timeout(&self) -> Option<Duration> {
        self.invoke_timeout_ms.map(Duration::from_millis)
    }

    /// The configured log level; unknown names fall back to INFO.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
