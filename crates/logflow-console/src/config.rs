//! Console configuration.
//!
//! Loaded from `<config dir>/logflow/config.toml` when present, otherwise
//! every field falls back to its default. CLI flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline applied to every backend request. The wire contract
    /// imposes none, so the limit lives client-side.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Health check cadence.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Log list refresh cadence while on the rolling live window.
    #[serde(default = "default_logs_interval_ms")]
    pub logs_interval_ms: u64,

    /// Metrics refresh cadence (basic and advanced).
    #[serde(default = "default_metrics_interval_ms")]
    pub metrics_interval_ms: u64,

    /// Maximum entries requested per log query.
    #[serde(default = "default_log_limit")]
    pub log_limit: usize,

    /// Offset of the zone operators type time-travel input in, minutes
    /// east of UTC. The conversion never consults the environment zone.
    #[serde(default = "default_input_utc_offset_minutes")]
    pub input_utc_offset_minutes: i32,

    /// Where exported reports land. Defaults to `./reports`.
    #[serde(default)]
    pub reports_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_heartbeat_interval_ms() -> u64 {
    5_000
}

fn default_logs_interval_ms() -> u64 {
    3_000
}

fn default_metrics_interval_ms() -> u64 {
    1_500
}

fn default_log_limit() -> usize {
    50
}

fn default_input_utc_offset_minutes() -> i32 {
    330 // UTC+05:30
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            logs_interval_ms: default_logs_interval_ms(),
            metrics_interval_ms: default_metrics_interval_ms(),
            log_limit: default_log_limit(),
            input_utc_offset_minutes: default_input_utc_offset_minutes(),
            reports_dir: None,
        }
    }
}

impl ConsoleConfig {
    /// Load from `path`, or from the default location if it exists, or
    /// fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(&p)
                    .map_err(|e| anyhow::anyhow!("reading config {}: {e}", p.display()))?;
                let config = toml::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", p.display()))?;
                tracing::debug!(path = %p.display(), "config loaded");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("logflow").join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn logs_interval(&self) -> Duration {
        Duration::from_millis(self.logs_interval_ms)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }

    /// The fixed offset time-travel input is interpreted in.
    pub fn input_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.input_utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset is valid"))
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.reports_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("reports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: ConsoleConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.heartbeat_interval_ms, 5_000);
        assert_eq!(config.logs_interval_ms, 3_000);
        assert_eq!(config.metrics_interval_ms, 1_500);
        assert_eq!(config.log_limit, 50);
        assert_eq!(config.input_utc_offset_minutes, 330);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: ConsoleConfig =
            toml::from_str("base_url = \"http://backend:9000\"\nlog_limit = 100\n").unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.log_limit, 100);
        assert_eq!(config.heartbeat_interval_ms, 5_000);
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "input_utc_offset_minutes = 0\n").unwrap();
        let config = ConsoleConfig::load(Some(&path)).unwrap();
        assert_eq!(config.input_utc_offset_minutes, 0);
        assert_eq!(config.input_zone().local_minus_utc(), 0);
    }

    #[test]
    fn input_zone_matches_offset() {
        let config = ConsoleConfig::default();
        assert_eq!(config.input_zone().local_minus_utc(), 330 * 60);
    }
}
