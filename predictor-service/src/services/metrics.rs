//! Metrics collection for predictor-service.
//!
//! HTTP metrics come from the `metrics` facade (see
//! `service_core::middleware::metrics`) and are rendered by the Prometheus
//! recorder. Generation counters live in a dedicated `prometheus` registry and
//! are appended to the same scrape output.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static DOMAIN_METRICS: OnceLock<DomainMetrics> = OnceLock::new();

struct DomainMetrics {
    registry: Registry,
    generations_total: IntCounterVec,
    credits_spent_total: IntCounter,
    provider_duration: HistogramVec,
}

impl DomainMetrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let generations_total = IntCounterVec::new(
            Opts::new(
                "question_generations_total",
                "Question generation attempts by input mode and outcome",
            ),
            &["mode", "outcome"],
        )?;

        let credits_spent_total = IntCounter::new(
            "credits_spent_total",
            "Credits consumed by successful generations",
        )?;

        let provider_duration = HistogramVec::new(
            HistogramOpts::new(
                "provider_request_duration_seconds",
                "Latency of outbound generation requests",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
            &["provider"],
        )?;

        registry.register(Box::new(generations_total.clone()))?;
        registry.register(Box::new(credits_spent_total.clone()))?;
        registry.register(Box::new(provider_duration.clone()))?;

        Ok(Self {
            registry,
            generations_total,
            credits_spent_total,
            provider_duration,
        })
    }
}

/// Install the Prometheus recorder and the domain registry.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_none() {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
        }
    }

    if DOMAIN_METRICS.get().is_none() {
        match DomainMetrics::build() {
            Ok(metrics) => {
                let _ = DOMAIN_METRICS.set(metrics);
            }
            Err(e) => tracing::error!(error = %e, "Failed to register generation metrics"),
        }
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(metrics) = DOMAIN_METRICS.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if encoder.encode(&metrics.registry.gather(), &mut buffer).is_ok() {
            if let Ok(domain) = String::from_utf8(buffer) {
                output.push_str(&domain);
            }
        }
    }

    output
}

/// Count a finished generation attempt.
pub fn record_generation(mode: &str, outcome: &str) {
    if let Some(metrics) = DOMAIN_METRICS.get() {
        metrics
            .generations_total
            .with_label_values(&[mode, outcome])
            .inc();
    }
}

pub fn record_credit_spent() {
    if let Some(metrics) = DOMAIN_METRICS.get() {
        metrics.credits_spent_total.inc();
    }
}

pub fn observe_provider_latency(provider: &str, seconds: f64) {
    if let Some(metrics) = DOMAIN_METRICS.get() {
        metrics
            .provider_duration
            .with_label_values(&[provider])
            .observe(seconds);
    }
}
