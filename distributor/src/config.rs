//! Distributor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use powdist_utils::LogFormat;

use crate::DistributorError;

/// Configuration for the distributor process.
///
/// Can be loaded from a TOML file via [`DistributorConfig::from_toml_file`]
/// or built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Host the HTTP listener binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP listener binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Backend node endpoints. Fixed for the lifetime of the process.
    #[serde(default)]
    pub urls: Vec<String>,

    /// Maximum number of cached work results.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Fan-out rounds tried before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Total timeout for one call to one backend node, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Connect timeout for one backend call, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Abort the remaining backend calls once a winner is found. When
    /// false they are detached and left to finish unobserved.
    #[serde(default = "default_true")]
    pub cancel_losing_calls: bool,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cache_capacity() -> usize {
    powdist_work::DEFAULT_CACHE_CAPACITY
}

fn default_max_attempts() -> u32 {
    5
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DistributorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DistributorError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DistributorError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DistributorError> {
        toml::from_str(s).map_err(|e| DistributorError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DistributorError> {
        toml::to_string_pretty(self).map_err(|e| DistributorError::Config(e.to_string()))
    }

    /// Reject settings the distributor cannot run with.
    ///
    /// An empty node list is allowed (every request then fails), but each
    /// listed node must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), DistributorError> {
        if self.max_attempts == 0 {
            return Err(DistributorError::Config(
                "max_attempts must be at least 1".into(),
            ));
        }
        for url in &self.urls {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| DistributorError::Config(format!("invalid node url {url}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DistributorError::Config(format!(
                    "node url {url} must use http or https"
                )));
            }
        }
        Ok(())
    }

    /// `host:port` for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            urls: Vec::new(),
            cache_capacity: default_cache_capacity(),
            max_attempts: default_max_attempts(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            cancel_losing_calls: default_true(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            enable_metrics: default_true(),
        }
    }
}
