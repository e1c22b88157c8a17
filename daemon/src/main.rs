//! PoW distributor daemon entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use powdist_distributor::{shutdown_signal, DistributorConfig, DistributorMetrics, WorkDistributor};
use powdist_rpc::{RpcServer, RpcState};
use powdist_utils::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "powdist", about = "Race work_generate requests across PoW backend nodes")]
struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port for the HTTP listener.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Backend node URLs (semicolon-separated: "http://a:7076;http://b:7076").
    #[arg(long, env = "URLS", value_delimiter = ';')]
    urls: Vec<String>,

    /// Maximum number of cached work results.
    #[arg(long, env = "POWDIST_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,

    /// Fan-out rounds tried before a request fails.
    #[arg(long, env = "POWDIST_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Timeout for one call to one backend node, in milliseconds.
    #[arg(long, env = "POWDIST_REQUEST_TIMEOUT_MS")]
    request_timeout_ms: Option<u64>,

    /// Connect timeout for one backend call, in milliseconds.
    #[arg(long, env = "POWDIST_CONNECT_TIMEOUT_MS")]
    connect_timeout_ms: Option<u64>,

    /// Abort losing backend calls once a winner is found ("true"/"false").
    #[arg(long, env = "POWDIST_CANCEL_LOSING_CALLS")]
    cancel_losing_calls: Option<bool>,

    /// Log format: "human" or "json".
    #[arg(long, env = "POWDIST_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "POWDIST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Do not serve `/metrics`.
    #[arg(long, env = "POWDIST_DISABLE_METRICS")]
    disable_metrics: bool,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn resolve_config(self) -> anyhow::Result<DistributorConfig> {
        let base = match &self.config {
            Some(path) => DistributorConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => DistributorConfig::default(),
        };

        // A trailing or doubled `;` in URLS leaves empty entries behind.
        let urls: Vec<String> = self
            .urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        let config = DistributorConfig {
            host: self.host.unwrap_or(base.host),
            port: self.port.unwrap_or(base.port),
            urls: if urls.is_empty() { base.urls } else { urls },
            cache_capacity: self.cache_capacity.unwrap_or(base.cache_capacity),
            max_attempts: self.max_attempts.unwrap_or(base.max_attempts),
            request_timeout_ms: self.request_timeout_ms.unwrap_or(base.request_timeout_ms),
            connect_timeout_ms: self.connect_timeout_ms.unwrap_or(base.connect_timeout_ms),
            cancel_losing_calls: self.cancel_losing_calls.unwrap_or(base.cancel_losing_calls),
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.unwrap_or(base.log_level),
            enable_metrics: base.enable_metrics && !self.disable_metrics,
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().resolve_config()?;

    powdist_utils::init_logging(config.log_format, &config.log_level)
        .context("failed to initialise logging")?;

    if config.urls.is_empty() {
        tracing::warn!("no backend nodes configured; every work request will fail");
    }
    tracing::info!(
        "Starting PoW distributor on {} ({} nodes, {} attempts, cache {})",
        config.listen_addr(),
        config.urls.len(),
        config.max_attempts,
        config.cache_capacity,
    );

    let metrics = Arc::new(DistributorMetrics::new());
    let distributor = Arc::new(WorkDistributor::from_config(&config, metrics)?);

    let server = RpcServer::new(
        config.listen_addr(),
        RpcState {
            distributor,
            metrics_enabled: config.enable_metrics,
        },
    );
    server.start(shutdown_signal()).await?;

    tracing::info!("PoW distributor exited cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["powdist"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn urls_split_on_semicolons() {
        let config = parse(&["--urls", "http://a:7076;http://b:7076"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.urls, vec!["http://a:7076", "http://b:7076"]);
    }

    #[test]
    fn empty_url_entries_are_dropped() {
        let config = parse(&["--urls", "http://a:7076;;http://b:7076;"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.urls, vec!["http://a:7076", "http://b:7076"]);
    }

    #[test]
    fn connect_timeout_is_configurable() {
        let config = parse(&["--connect-timeout-ms", "750"]).resolve_config().unwrap();
        assert_eq!(config.connect_timeout_ms, 750);
    }

    #[test]
    fn cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("powdist.toml");
        std::fs::write(
            &path,
            "cache_capacity = 64\nmax_attempts = 2\nurls = [\"http://file:7076\"]\n",
        )
        .unwrap();

        let config = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--max-attempts",
            "7",
            "--disable-metrics",
        ])
        .resolve_config()
        .unwrap();

        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.urls, vec!["http://file:7076"]);
        assert!(!config.enable_metrics);
    }

    #[test]
    fn invalid_settings_are_refused() {
        assert!(parse(&["--max-attempts", "0"]).resolve_config().is_err());
        assert!(parse(&["--urls", "ftp://node"]).resolve_config().is_err());
    }
}
