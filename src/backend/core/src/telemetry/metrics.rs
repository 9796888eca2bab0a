//! Prometheus metrics.
//!
//! Components record through the `metrics` macros; this module installs the
//! Prometheus recorder once per process and renders its text exposition for
//! `GET /metrics`.

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global metrics registry.
static METRICS_REGISTRY: OnceLock<MetricsRegistry> = OnceLock::new();

/// Name of the storage latency histogram.
pub const STORAGE_DURATION_METRIC: &str = "mi8_storage_operation_duration_seconds";

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,

    /// Histogram buckets for storage durations (in seconds)
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    /// Global labels to add to all metrics
    #[serde(default)]
    pub global_labels: HashMap<String, String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            duration_buckets: default_duration_buckets(),
            global_labels: HashMap::new(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_duration_buckets() -> Vec<f64> {
    vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
}

/// Process-wide handle to the installed recorder.
pub struct MetricsRegistry {
    prometheus_handle: Option<PrometheusHandle>,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("prometheus_handle", &self.prometheus_handle.is_some())
            .finish()
    }
}

impl MetricsRegistry {
    /// Get the global metrics registry. Empty until [`init_metrics`] runs.
    pub fn global() -> &'static MetricsRegistry {
        METRICS_REGISTRY.get_or_init(|| MetricsRegistry {
            prometheus_handle: None,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.prometheus_handle.is_some()
    }

    /// Render all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.prometheus_handle
            .as_ref()
            .map(|h| h.render())
            .unwrap_or_default()
    }
}

/// Install the Prometheus recorder and publish its handle globally.
///
/// Must run before anything calls [`MetricsRegistry::global`].
pub fn init_metrics(config: &MetricsConfig) -> anyhow::Result<&'static MetricsRegistry> {
    if !config.enabled {
        return Ok(MetricsRegistry::global());
    }

    let mut builder = PrometheusBuilder::new();
    for (key, value) in &config.global_labels {
        builder = builder.add_global_label(key, value);
    }
    builder = builder.set_buckets_for_metric(
        Matcher::Full(STORAGE_DURATION_METRIC.to_string()),
        &config.duration_buckets,
    )?;

    let handle = builder.install_recorder()?;
    register_metric_descriptions();

    if METRICS_REGISTRY
        .set(MetricsRegistry {
            prometheus_handle: Some(handle),
        })
        .is_err()
    {
        anyhow::bail!("metrics registry already initialised");
    }

    tracing::info!("Metrics initialized");
    Ok(MetricsRegistry::global())
}

fn register_metric_descriptions() {
    describe_counter!(
        "mi8_events_ingested_total",
        "News events stored, labelled by whether they were scored"
    );
    describe_counter!(
        "mi8_aggregation_failures_total",
        "Events stored whose ledger or ranking update failed"
    );
    describe_histogram!(
        STORAGE_DURATION_METRIC,
        Unit::Seconds,
        "Storage backend round trip duration"
    );
    describe_counter!(
        "mi8_storage_operations_total",
        "Operations served by the in-memory backend"
    );
    describe_gauge!(
        "mi8_ranking_total_score",
        "Latest total score published to the ranking per city"
    );
    describe_counter!("mi8_errors_total", "Errors by code, category and severity");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_disabled_init_renders_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };
        let registry = init_metrics(&config).unwrap();
        assert!(!registry.is_enabled());
        assert!(registry.render().is_empty());
    }
}
