//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - XP awarded and level-up counters
//! - DGT moved by tips and rain

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace("degentalk"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("degentalk")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// XP awarded counter, labeled by the action that earned it
pub static XP_AWARDED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("xp_awarded_total", "Total XP awarded to users").namespace("degentalk"),
        &["action"],
    )
    .expect("Failed to create XP_AWARDED_TOTAL metric")
});

/// Level-up counter
pub static LEVEL_UPS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("level_ups_total", "Total user level-ups").namespace("degentalk"),
    )
    .expect("Failed to create LEVEL_UPS_TOTAL metric")
});

/// Multiplier cap violation counter, labeled by enforcement mode
pub static MULTIPLIER_VIOLATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "multiplier_violations_total",
            "XP multiplier cap violations",
        )
        .namespace("degentalk"),
        &["enforcement"],
    )
    .expect("Failed to create MULTIPLIER_VIOLATIONS_TOTAL metric")
});

/// DGT units moved by tips
pub static DGT_TIPPED_UNITS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("dgt_tipped_units_total", "DGT units moved by tips").namespace("degentalk"),
    )
    .expect("Failed to create DGT_TIPPED_UNITS_TOTAL metric")
});

/// Rain event counter
pub static RAIN_EVENTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("rain_events_total", "Total rain events").namespace("degentalk"),
    )
    .expect("Failed to create RAIN_EVENTS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(XP_AWARDED_TOTAL.clone()))
        .expect("Failed to register XP_AWARDED_TOTAL");
    registry
        .register(Box::new(LEVEL_UPS_TOTAL.clone()))
        .expect("Failed to register LEVEL_UPS_TOTAL");
    registry
        .register(Box::new(MULTIPLIER_VIOLATIONS_TOTAL.clone()))
        .expect("Failed to register MULTIPLIER_VIOLATIONS_TOTAL");
    registry
        .register(Box::new(DGT_TIPPED_UNITS_TOTAL.clone()))
        .expect("Failed to register DGT_TIPPED_UNITS_TOTAL");
    registry
        .register(Box::new(RAIN_EVENTS_TOTAL.clone()))
        .expect("Failed to register RAIN_EVENTS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record an XP award
pub fn record_xp_award(action: &str, amount: i64, leveled_up: bool) {
    XP_AWARDED_TOTAL
        .with_label_values(&[action])
        .inc_by(amount.max(0) as u64);
    if leveled_up {
        LEVEL_UPS_TOTAL.inc();
    }
}

/// Helper to record a multiplier cap violation
pub fn record_multiplier_violation(enforcement: &str) {
    MULTIPLIER_VIOLATIONS_TOTAL
        .with_label_values(&[enforcement])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*XP_AWARDED_TOTAL;
        let _ = &*RAIN_EVENTS_TOTAL;
    }

    #[test]
    fn test_gather_metrics() {
        let metrics = gather_metrics();
        assert!(!metrics.is_empty());
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("http_requests_total"));
    }

    #[test]
    fn test_record_xp_award() {
        record_xp_award("post", 25, true);
        let metrics = gather_metrics();
        assert!(metrics.contains("xp_awarded_total"));
        assert!(metrics.contains("level_ups_total"));
    }
}
