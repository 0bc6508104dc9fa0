//! Prometheus metrics for coach-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Registry plus the collectors registered in it.
pub struct CoachMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    provider_latency: HistogramVec,
    provider_errors: IntCounterVec,
    quota_rejections: IntCounter,
}

// Global metrics; the registry and its collectors are published together.
pub static METRICS: OnceLock<CoachMetrics> = OnceLock::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    // Outcome per endpoint: answered, placeholder, rejected, failed
    let requests_total = IntCounterVec::new(
        Opts::new("coach_requests_total", "Total coaching requests by outcome"),
        &["endpoint", "outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "coach_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["provider", "operation"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new("coach_provider_errors_total", "Total AI provider errors"),
        &["provider", "error_type"],
    )?;

    let quota_rejections = IntCounter::new(
        "coach_quota_rejections_total",
        "Requests rejected because the free question limit was reached",
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(quota_rejections.clone()))?;

    // A concurrent initializer may win the race; its set is equally complete.
    let _ = METRICS.set(CoachMetrics {
        registry,
        requests_total,
        provider_latency,
        provider_errors,
        quota_rejections,
    });

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

pub fn record_request(endpoint: &str, outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics.requests_total.with_label_values(&[endpoint, outcome]).inc();
    }
}

pub fn record_provider_latency(provider: &str, operation: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .provider_latency
            .with_label_values(&[provider, operation])
            .observe(duration_secs);
    }
}

pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics.provider_errors.with_label_values(&[provider, error_type]).inc();
    }
}

pub fn record_quota_rejection() {
    if let Some(metrics) = METRICS.get() {
        metrics.quota_rejections.inc();
    }
}
