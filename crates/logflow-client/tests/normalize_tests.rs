use logflow_client::api::{normalize_logs, normalize_metrics};
use logflow_core::{LogId, LogLevel};
use serde_json::json;

#[test]
fn bare_log_list_normalizes() {
    let payload = json!([
        {"id": 1, "level": "ERROR", "service": "auth-service",
         "message": "timeout", "timestamp": "2026-02-01T15:52:00Z"},
        {"id": 2, "level": "INFO", "service": "cache",
         "message": "warm", "timestamp": "2026-02-01T15:53:00Z"}
    ]);
    let logs = normalize_logs(payload).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].id, Some(LogId::Number(1)));
    assert_eq!(logs[0].level, LogLevel::Error);
}

#[test]
fn wrapped_log_list_normalizes_to_same_shape() {
    let payload = json!({
        "count": 1,
        "logs": [
            {"id": 7, "level": "WARN", "service": "api-gateway",
             "message": "slow", "timestamp": "2026-02-01T15:52:00Z"}
        ]
    });
    let logs = normalize_logs(payload).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].service, "api-gateway");
}

#[test]
fn null_wrapped_logs_become_empty() {
    let logs = normalize_logs(json!({"count": 0, "logs": null})).unwrap();
    assert!(logs.is_empty());
}

#[test]
fn unexpected_log_shape_is_malformed() {
    assert!(normalize_logs(json!("not logs")).is_err());
}

#[test]
fn metrics_derive_rate_when_absent() {
    let snapshot = normalize_metrics(json!({
        "log_counts": {"ERROR": 25, "INFO": 50, "WARNING": 25}
    }))
    .unwrap();
    assert_eq!(snapshot.total, 100);
    assert_eq!(snapshot.error_count, 25);
    assert_eq!(snapshot.error_rate_pct, 25);
}

#[test]
fn metrics_zero_counts_have_zero_rate() {
    let snapshot = normalize_metrics(json!({
        "log_counts": {"ERROR": 0, "WARN": 0, "INFO": 0}
    }))
    .unwrap();
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.error_rate_pct, 0);
}

#[test]
fn metrics_prefer_explicit_fields() {
    let snapshot = normalize_metrics(json!({
        "log_counts": {"ERROR": 10, "INFO": 10, "total": 20},
        "error_rate": 77,
        "error_count": 12,
        "unique_services": 4
    }))
    .unwrap();
    assert_eq!(snapshot.error_rate_pct, 77);
    assert_eq!(snapshot.error_count, 12);
    assert_eq!(snapshot.total, 20);
    assert_eq!(snapshot.unique_services, 4);
}

#[test]
fn service_table_accepts_list_and_map() {
    let from_list = normalize_metrics(json!({
        "all_services": [
            {"name": "auth-service", "errors": 9, "status": "Degraded"}
        ]
    }))
    .unwrap();
    assert_eq!(from_list.services.len(), 1);
    assert_eq!(from_list.services[0].status, "Degraded");

    let from_map = normalize_metrics(json!({
        "top_services": {"api-gateway": 452, "database": 289}
    }))
    .unwrap();
    assert_eq!(from_map.services.len(), 2);
    assert!(from_map
        .services
        .iter()
        .any(|s| s.name == "api-gateway" && s.errors == 452));
}

#[test]
fn empty_metrics_payload_defaults_to_zeroes() {
    let snapshot = normalize_metrics(json!({})).unwrap();
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.error_rate_pct, 0);
    assert!(snapshot.services.is_empty());
}
