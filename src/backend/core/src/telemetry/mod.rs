//! Telemetry: structured logging and Prometheus metrics.
//!
//! - **Logging**: JSON/pretty/compact output through `tracing-subscriber`
//! - **Metrics**: Prometheus exposition of ingestion, storage and ranking metrics
//!
//! # Example
//!
//! ```rust,no_run
//! use mi8_core::telemetry::{init_telemetry, LoggingConfig, MetricsConfig};
//!
//! init_telemetry(&LoggingConfig::default(), &MetricsConfig::default())
//!     .expect("Failed to initialize telemetry");
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{build_filter, init_logging, LogFormat, LoggingConfig};
pub use metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Initialize logging, then metrics.
pub fn init_telemetry(logging: &LoggingConfig, metrics: &MetricsConfig) -> anyhow::Result<()> {
    init_logging(logging)?;
    init_metrics(metrics)?;
    Ok(())
}
