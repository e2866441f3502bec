use serde::Deserialize;
use std::path::PathBuf;
use crate::error::{StoreError, Result};

/// Environment variable that overrides `api.port`.
pub const PORT_ENV: &str = "PORT";

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP API configuration.
    #[serde(default)]
    pub api: ApiConfig,
}

/// HTTP API configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Address to bind.
    #[serde(default = "default_api_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Largest accepted upload body, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ApiConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload limit in bytes, saturating at `usize::MAX`.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}

const BYTES_PER_MB: usize = 1024 * 1024;

fn default_api_host() -> String { "127.0.0.1".into() }
fn default_api_port() -> u16 { 8080 }
fn default_max_upload_mb() -> usize { 64 }

/// Where object files live.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one file per object.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Wipe and recreate `root` on startup. Off by default: leftovers from a
    /// previous run are never indexed, so they are unreachable but harmless.
    #[serde(default = "default_reset_on_start")]
    pub reset_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: default_root(), reset_on_start: default_reset_on_start() }
    }
}

fn default_root() -> PathBuf { PathBuf::from("storage") }
fn default_reset_on_start() -> bool { false }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| StoreError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults; then apply the
    /// `PORT` override.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_port_override(std::env::var(PORT_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// Replace `api.port` with `value` when it is set and non-empty.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(raw) = value.filter(|v| !v.trim().is_empty()) {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|e| StoreError::Config(format!("Invalid {PORT_ENV} '{raw}': {e}")))?;
            if port == 0 {
                return Err(StoreError::Config(format!("{PORT_ENV} must be > 0")));
            }
            self.api.port = port;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.storage.root.as_os_str().is_empty() {
            return Err(StoreError::Config("storage.root must not be empty".into()));
        }
        if self.api.port == 0 {
            return Err(StoreError::Config("api.port must be > 0".into()));
        }
        if self.api.max_upload_mb == 0 {
            return Err(StoreError::Config("api.max_upload_mb must be > 0".into()));
        }
        if self.api.max_upload_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(StoreError::Config(format!(
                "api.max_upload_mb = {} is too large",
                self.api.max_upload_mb
            )));
        }
        Ok(())
    }
}
