//! Typed request layer over the backend's JSON endpoints.
//!
//! One method per backend capability. Every response is normalized here,
//! at the boundary, so shape drift (bare vs wrapped log lists, missing
//! metric fields, list-or-map service tables) never reaches a view. No
//! retries happen in this layer.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use logflow_core::{
    AdvancedMetricsSnapshot, AiAnswer, ApiError, ComparisonResult, HealthReport, IngestAck,
    LogDraft, LogEntry, LogWindow, MetricsSnapshot, ServiceHealth, SummaryReport,
};

/// Base64-encoded image attached to an AI request.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub image_data: String,
    pub mime_type: String,
}

#[derive(Serialize)]
struct AskBody<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
}

#[derive(Serialize)]
struct CompareBody<'a> {
    healthy: String,
    crash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
}

/// Client for one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client with an explicit request timeout. The backend
    /// contract imposes none, so the deadline lives here.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn check_health(&self) -> Result<HealthReport, ApiError> {
        let value = self.get("/health", &[]).await?;
        decode(value)
    }

    /// Logs within `window`, newest first, at most `limit` entries.
    pub async fn fetch_logs(
        &self,
        window: &LogWindow,
        limit: usize,
    ) -> Result<Vec<LogEntry>, ApiError> {
        let query = [
            ("from".to_string(), wire_instant(window.from)),
            ("to".to_string(), wire_instant(window.to)),
            ("limit".to_string(), limit.to_string()),
        ];
        let value = self.get("/logs", &query).await?;
        normalize_logs(value)
    }

    pub async fn fetch_metrics(&self) -> Result<MetricsSnapshot, ApiError> {
        let value = self.get("/metrics", &[]).await?;
        normalize_metrics(value)
    }

    pub async fn fetch_advanced_metrics(&self) -> Result<AdvancedMetricsSnapshot, ApiError> {
        let value = self.get("/metrics/advanced", &[]).await?;
        decode(value)
    }

    /// Submit a log record; the backend echoes the assigned id.
    pub async fn ingest(&self, draft: &LogDraft) -> Result<IngestAck, ApiError> {
        let value = self.post("/ingest", draft).await?;
        decode(value)
    }

    /// Free-form question, optionally with an attached image.
    pub async fn ask(
        &self,
        question: &str,
        image: Option<&Attachment>,
    ) -> Result<AiAnswer, ApiError> {
        let body = AskBody {
            question,
            image_data: image.map(|a| a.image_data.as_str()),
            mime_type: image.map(|a| a.mime_type.as_str()),
        };
        let value = self.post("/ai/query", &body).await?;
        decode(value)
    }

    /// Differential analysis of the periods starting at `healthy` and
    /// `crash`, optionally with an attached image.
    pub async fn compare(
        &self,
        healthy: DateTime<Utc>,
        crash: DateTime<Utc>,
        image: Option<&Attachment>,
    ) -> Result<ComparisonResult, ApiError> {
        let body = CompareBody {
            healthy: wire_instant(healthy),
            crash: wire_instant(crash),
            image_data: image.map(|a| a.image_data.as_str()),
            mime_type: image.map(|a| a.mime_type.as_str()),
        };
        let value = self.post("/ai/compare", &body).await?;
        decode(value)
    }

    pub async fn fetch_summary(&self) -> Result<SummaryReport, ApiError> {
        let value = self.get("/ai/summary", &[]).await?;
        decode(value)
    }

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await;
        Self::handle(response).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await;
        Self::handle(response).await
    }

    async fn handle(response: Result<reqwest::Response, reqwest::Error>) -> Result<Value, ApiError> {
        let response = response.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "backend error response");
            return Err(ApiError::backend(status.as_u16(), &body));
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

/// All instants cross the wire as RFC 3339 with the UTC designator.
fn wire_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
}

/// Accepted shapes of a logs response. Resolved once, here, so downstream
/// consumers always see a plain ordered list.
#[derive(Deserialize)]
#[serde(untagged)]
enum LogsPayload {
    Bare(Vec<LogEntry>),
    Wrapped {
        #[serde(default)]
        logs: Option<Vec<LogEntry>>,
    },
}

/// Unify the bare-list and wrapped-object log shapes.
pub fn normalize_logs(value: Value) -> Result<Vec<LogEntry>, ApiError> {
    match decode::<LogsPayload>(value)? {
        LogsPayload::Bare(logs) => Ok(logs),
        LogsPayload::Wrapped { logs } => Ok(logs.unwrap_or_default()),
    }
}

/// The service table arrives either as a list of service objects or as a
/// plain name-to-count map, depending on backend version.
#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceTable {
    List(Vec<ServiceHealth>),
    Map(BTreeMap<String, u64>),
}

impl Default for ServiceTable {
    fn default() -> Self {
        ServiceTable::List(Vec::new())
    }
}

impl ServiceTable {
    fn into_list(self) -> Vec<ServiceHealth> {
        match self {
            ServiceTable::List(list) => list,
            ServiceTable::Map(map) => map
                .into_iter()
                .map(|(name, count)| ServiceHealth {
                    name,
                    errors: count,
                    status: "Online".to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Default, Deserialize)]
struct RawMetrics {
    #[serde(default)]
    log_counts: BTreeMap<String, u64>,
    #[serde(default)]
    error_rate: Option<u64>,
    #[serde(default)]
    error_count: Option<u64>,
    #[serde(default)]
    warning_count: Option<u64>,
    #[serde(default)]
    info_count: Option<u64>,
    #[serde(default)]
    unique_services: u64,
    #[serde(default)]
    top_services: ServiceTable,
    #[serde(default)]
    all_services: Vec<ServiceHealth>,
}

fn count_for(counts: &BTreeMap<String, u64>, names: &[&str]) -> u64 {
    names
        .iter()
        .find_map(|name| {
            counts
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| *v)
        })
        .unwrap_or(0)
}

/// Normalize a metrics payload: every count defaults to 0 and the error
/// rate is derived locally (zero-guarded) when the backend omits it.
pub fn normalize_metrics(value: Value) -> Result<MetricsSnapshot, ApiError> {
    let raw: RawMetrics = decode(value)?;

    let error_count = raw
        .error_count
        .unwrap_or_else(|| count_for(&raw.log_counts, &["ERROR"]));
    let warning_count = raw
        .warning_count
        .unwrap_or_else(|| count_for(&raw.log_counts, &["WARNING", "WARN"]));
    let info_count = raw
        .info_count
        .unwrap_or_else(|| count_for(&raw.log_counts, &["INFO"]));

    let total = match raw.log_counts.get("total") {
        Some(total) => *total,
        None => raw
            .log_counts
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("total"))
            .map(|(_, v)| v)
            .sum(),
    };

    let error_rate_pct = match raw.error_rate {
        Some(rate) => rate,
        None if total > 0 => error_count * 100 / total,
        None => 0,
    };

    let services = if raw.all_services.is_empty() {
        raw.top_services.into_list()
    } else {
        raw.all_services
    };

    Ok(MetricsSnapshot {
        total,
        error_count,
        warning_count,
        info_count,
        error_rate_pct,
        unique_services: raw.unique_services,
        services,
    })
}
