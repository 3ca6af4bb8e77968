//! Telemetry for the Data Quality Validation Agent
//!
//! - `metrics` - Prometheus metrics for validation runs and audit appends
//!
//! Metrics are collected in a private registry per process and can be
//! written to a file in the Prometheus text exposition format.

pub mod metrics;

pub use metrics::{QualityMetrics, QualityMetricsRegistry, RunTimer};

use std::path::Path;

use crate::error::{Result, ValidationError};

/// Write the registry's metrics to `path`, creating parent directories
pub fn write_metrics_file(registry: &QualityMetricsRegistry, path: &Path) -> Result<()> {
    let text = registry.encode_text()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ValidationError::file_error(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(path, text).map_err(|e| {
        ValidationError::file_error(format!("Cannot write metrics to {}: {}", path.display(), e))
    })?;
    tracing::debug!(path = %path.display(), "Metrics written");
    Ok(())
}
