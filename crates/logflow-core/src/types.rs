use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Opaque log identifier. The backend assigns numeric ids today, but the
/// contract only promises "string or number", so both decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogId {
    Number(i64),
    Text(String),
}

impl LogId {
    /// Parse the digits of a citation into an id, preferring the numeric
    /// form so it compares equal to backend-assigned ids.
    pub fn from_citation(digits: &str) -> Self {
        digits
            .parse::<i64>()
            .map(LogId::Number)
            .unwrap_or_else(|_| LogId::Text(digits.to_string()))
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogId::Number(n) => write!(f, "{n}"),
            LogId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for LogId {
    fn from(n: i64) -> Self {
        LogId::Number(n)
    }
}

impl From<&str> for LogId {
    fn from(s: &str) -> Self {
        LogId::Text(s.to_string())
    }
}

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    // The backend emits both WARN and WARNING; anything unrecognized
    // lands in the DEBUG bucket rather than failing the whole payload.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_uppercase().as_str() {
            "ERROR" => LogLevel::Error,
            "WARN" | "WARNING" => LogLevel::Warn,
            "INFO" => LogLevel::Info,
            _ => LogLevel::Debug,
        })
    }
}

/// A single ingested log record. Immutable once received; identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub id: Option<LogId>,
    pub level: LogLevel,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A bounded time range scoping a log query. `from <= to` always.
///
/// Held only by the coordinator and replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub label: Option<String>,
}

impl LogWindow {
    /// The rolling live window: the last hour ending at `now`.
    pub fn last_hour(now: DateTime<Utc>) -> Self {
        Self {
            from: now - chrono::Duration::hours(1),
            to: now,
            label: None,
        }
    }
}

/// The cross-view "log of interest". `triggered_at` strictly increases on
/// every update so that re-citing the same log re-runs the scroll/pulse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub log_id: Option<LogId>,
    pub triggered_at: u64,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            log_id: None,
            triggered_at: 0,
        }
    }
}

/// Backend reachability, recomputed on every heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Offline,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Offline => "offline",
        }
    }
}

/// Wire shape of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
}

/// Per-service error tally as reported by the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub name: String,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub status: String,
}

/// Aggregate log counts with derived rates. Recomputed on every poll tick
/// and replaced wholesale; never merged with the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub total: u64,
    pub error_count: u64,
    pub warning_count: u64,
    pub info_count: u64,
    /// Integer percentage, zero when no logs exist.
    pub error_rate_pct: u64,
    pub unique_services: u64,
    pub services: Vec<ServiceHealth>,
}

/// A `{name, count}` row in the advanced metrics tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// Structured aggregates the backend extracts from log message fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdvancedMetricsSnapshot {
    #[serde(default)]
    pub top_users: Vec<NamedCount>,
    #[serde(default)]
    pub top_orders: Vec<NamedCount>,
    #[serde(default)]
    pub top_products: Vec<NamedCount>,
    #[serde(default)]
    pub top_error_reasons: Vec<NamedCount>,
    #[serde(default)]
    pub avg_response_time: u64,
    #[serde(default)]
    pub total_timeouts: u64,
    #[serde(default)]
    pub avg_retry_attempts: u64,
    #[serde(default)]
    pub avg_stock_level: u64,
}

/// Differential analysis of a healthy and a crash period. Produced once per
/// comparison request, replacing any prior result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ComparisonResult {
    #[serde(default)]
    pub healthy_count: u64,
    #[serde(default)]
    pub crash_count: u64,
    #[serde(default)]
    pub analysis: String,
}

/// Answer from the free-form AI endpoint. When the model detected a time
/// range, `from_time`/`to_time` carry it so the caller can pin the window.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AiAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub from_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_range: Option<String>,
}

/// Fleet-wide AI summary with the statistics it was computed from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub total_logs: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub warning_count: u64,
    #[serde(default)]
    pub info_count: u64,
    #[serde(default)]
    pub top_services: BTreeMap<String, u64>,
}

/// Payload for submitting a log record. The backend assigns the id and
/// stamps the ingest time when `timestamp` is omitted.
#[derive(Debug, Clone, Serialize)]
pub struct LogDraft {
    pub service: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The backend's accepted echo for an ingested log.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestAck {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub id: Option<LogId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_id_decodes_number_and_text() {
        let n: LogId = serde_json::from_str("42").unwrap();
        assert_eq!(n, LogId::Number(42));
        let s: LogId = serde_json::from_str("\"abc-7\"").unwrap();
        assert_eq!(s, LogId::Text("abc-7".to_string()));
    }

    #[test]
    fn citation_digits_compare_equal_to_numeric_ids() {
        assert_eq!(LogId::from_citation("42"), LogId::Number(42));
    }

    #[test]
    fn level_aliases_and_unknowns() {
        let warn: LogLevel = serde_json::from_str("\"WARNING\"").unwrap();
        assert_eq!(warn, LogLevel::Warn);
        let lower: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(lower, LogLevel::Error);
        let odd: LogLevel = serde_json::from_str("\"TRACE\"").unwrap();
        assert_eq!(odd, LogLevel::Debug);
    }

    #[test]
    fn last_hour_window_spans_one_hour() {
        let now = Utc::now();
        let w = LogWindow::last_hour(now);
        assert_eq!(w.to - w.from, chrono::Duration::hours(1));
        assert!(w.from <= w.to);
    }
}
