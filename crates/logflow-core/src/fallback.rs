//! Degraded-mode behavior: health classification and synthetic data.
//!
//! The dashboard never shows a blank screen. When a data fetch fails
//! entirely the owning view substitutes the fixed-content data below and
//! flags the connection state, so operators see a recognizable (and
//! recognizably canned) picture instead of empty panels.

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::types::{
    HealthReport, HealthStatus, LogEntry, LogId, LogLevel, MetricsSnapshot, ServiceHealth,
};

/// Status string a healthy backend reports from `/health`.
pub const HEALTHY_STATUS: &str = "healthy";

/// Classify a heartbeat outcome.
///
/// A reachable backend that reports anything but the healthy status is
/// degraded; an unreachable one (transport or HTTP failure alike) is
/// offline, and the two must render distinctly.
pub fn classify_health(outcome: &Result<HealthReport, ApiError>) -> HealthStatus {
    match outcome {
        Ok(report) if report.status == HEALTHY_STATUS => HealthStatus::Healthy,
        Ok(_) => HealthStatus::Degraded,
        Err(_) => HealthStatus::Offline,
    }
}

/// Connection state implied by a failed data fetch while the heartbeat
/// may still be answering: transport failures read as offline, HTTP
/// failures as degraded.
pub fn classify_data_failure(err: &ApiError) -> HealthStatus {
    match err {
        ApiError::Network(_) => HealthStatus::Offline,
        ApiError::Backend { .. } | ApiError::Malformed(_) => HealthStatus::Degraded,
    }
}

/// Fixed-content stand-in log records, stamped with `anchor` so callers
/// (and tests) control the only varying field.
pub fn synthetic_logs(anchor: DateTime<Utc>) -> Vec<LogEntry> {
    let entry = |id: i64, level: LogLevel, service: &str, message: &str| LogEntry {
        id: Some(LogId::Number(id)),
        level,
        service: service.to_string(),
        message: message.to_string(),
        timestamp: anchor,
    };
    vec![
        entry(1, LogLevel::Error, "auth-service", "Authentication timeout after 30s"),
        entry(2, LogLevel::Warn, "api-gateway", "High memory usage detected: 85%"),
        entry(3, LogLevel::Info, "database", "Connection pool resized to 50 connections"),
        entry(4, LogLevel::Error, "payment-service", "Failed to process payment: timeout"),
        entry(5, LogLevel::Info, "cache", "Redis cache hit rate: 94.2%"),
    ]
}

/// Fixed-content stand-in metrics matching the synthetic log fleet.
pub fn synthetic_metrics() -> MetricsSnapshot {
    let services = vec![
        ServiceHealth {
            name: "api-gateway".to_string(),
            errors: 452,
            status: "Degraded".to_string(),
        },
        ServiceHealth {
            name: "auth-service".to_string(),
            errors: 328,
            status: "Degraded".to_string(),
        },
        ServiceHealth {
            name: "database".to_string(),
            errors: 289,
            status: "Degraded".to_string(),
        },
    ];
    let (error_count, warning_count, info_count) = (24, 156, 892);
    let total = error_count + warning_count + info_count;
    MetricsSnapshot {
        total,
        error_count,
        warning_count,
        info_count,
        error_rate_pct: error_count * 100 / total,
        unique_services: services.len() as u64,
        services,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_report_classifies_healthy() {
        let outcome = Ok(HealthReport {
            status: "healthy".to_string(),
            database: Some("connected".to_string()),
        });
        assert_eq!(classify_health(&outcome), HealthStatus::Healthy);
    }

    #[test]
    fn unhealthy_report_classifies_degraded() {
        let outcome = Ok(HealthReport {
            status: "unhealthy".to_string(),
            database: None,
        });
        assert_eq!(classify_health(&outcome), HealthStatus::Degraded);
    }

    #[test]
    fn any_error_classifies_offline() {
        let network: Result<HealthReport, ApiError> =
            Err(ApiError::Network("connection refused".to_string()));
        assert_eq!(classify_health(&network), HealthStatus::Offline);

        let backend: Result<HealthReport, ApiError> = Err(ApiError::backend(503, "unavailable"));
        assert_eq!(classify_health(&backend), HealthStatus::Offline);
    }

    #[test]
    fn data_failures_split_by_kind() {
        assert_eq!(
            classify_data_failure(&ApiError::Network("timed out".to_string())),
            HealthStatus::Offline
        );
        assert_eq!(
            classify_data_failure(&ApiError::backend(500, "boom")),
            HealthStatus::Degraded
        );
    }

    #[test]
    fn synthetic_logs_are_deterministic() {
        let anchor = Utc::now();
        let a = synthetic_logs(anchor);
        let b = synthetic_logs(anchor);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert!(a.iter().all(|log| log.timestamp == anchor));
    }

    #[test]
    fn synthetic_metrics_rate_is_consistent() {
        let m = synthetic_metrics();
        assert_eq!(m.total, 1072);
        assert_eq!(m.error_rate_pct, m.error_count * 100 / m.total);
    }
}
