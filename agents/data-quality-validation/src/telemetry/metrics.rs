//! Prometheus metrics for the Data Quality Validation Agent
//!
//! - `data_quality_runs_total` (counter) - Validation runs by severity
//! - `data_quality_run_duration_seconds` (histogram) - Run duration distribution
//! - `data_quality_issues_total` (counter) - Flagged issues by category and severity
//! - `data_quality_dataset_rows` / `data_quality_dataset_columns` (gauges) - Last dataset shape
//! - `data_quality_audit_entries_appended_total` / `..._failed_total` (counters)
//!
//! # Example
//!
//! ```rust,no_run
//! use data_quality_validation::telemetry::QualityMetricsRegistry;
//!
//! let registry = QualityMetricsRegistry::new().unwrap();
//! let metrics = registry.quality();
//!
//! metrics.record_run("MEDIUM");
//! metrics.observe_duration(0.012);
//! metrics.record_issue("anomaly", "MEDIUM");
//!
//! println!("{}", registry.encode_text().unwrap());
//! ```

use prometheus::{Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, ValidationError};
use crate::report::ValidationReport;

const NAMESPACE: &str = "data_quality";

/// Validation metrics for Prometheus
pub struct QualityMetrics {
    /// Validation runs by overall severity
    runs_total: CounterVec,

    /// Run duration in seconds
    duration_seconds: Histogram,

    /// Flagged issues by category and severity
    issues_total: CounterVec,

    /// Rows in the most recently validated dataset
    dataset_rows: Gauge,

    /// Columns in the most recently validated dataset
    dataset_columns: Gauge,

    audit_appended_total: Counter,

    audit_failed_total: Counter,
}

impl QualityMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let runs_total = CounterVec::new(
            Opts::new("runs_total", "Total number of dataset validation runs")
                .namespace(NAMESPACE),
            &["severity"],
        )?;

        let duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "run_duration_seconds",
                "Dataset validation duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        let issues_total = CounterVec::new(
            Opts::new("issues_total", "Total number of flagged data quality issues")
                .namespace(NAMESPACE),
            &["category", "severity"],
        )?;

        let dataset_rows = Gauge::with_opts(
            Opts::new("dataset_rows", "Rows in the last validated dataset").namespace(NAMESPACE),
        )?;

        let dataset_columns = Gauge::with_opts(
            Opts::new("dataset_columns", "Columns in the last validated dataset")
                .namespace(NAMESPACE),
        )?;

        let audit_appended_total = Counter::with_opts(
            Opts::new(
                "audit_entries_appended_total",
                "Total number of entries appended to the audit trail",
            )
            .namespace(NAMESPACE),
        )?;

        let audit_failed_total = Counter::with_opts(
            Opts::new(
                "audit_entries_failed_total",
                "Total number of failed audit trail appends",
            )
            .namespace(NAMESPACE),
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(issues_total.clone()))?;
        registry.register(Box::new(dataset_rows.clone()))?;
        registry.register(Box::new(dataset_columns.clone()))?;
        registry.register(Box::new(audit_appended_total.clone()))?;
        registry.register(Box::new(audit_failed_total.clone()))?;

        Ok(Self {
            runs_total,
            duration_seconds,
            issues_total,
            dataset_rows,
            dataset_columns,
            audit_appended_total,
            audit_failed_total,
        })
    }

    pub fn record_run(&self, severity: &str) {
        self.runs_total.with_label_values(&[severity]).inc();
    }

    pub fn observe_duration(&self, duration_secs: f64) {
        self.duration_seconds.observe(duration_secs);
    }

    pub fn record_issue(&self, category: &str, severity: &str) {
        self.issues_total
            .with_label_values(&[category, severity])
            .inc();
    }

    pub fn set_dataset_shape(&self, rows: usize, columns: usize) {
        self.dataset_rows.set(rows as f64);
        self.dataset_columns.set(columns as f64);
    }

    /// Record everything derivable from a finished report
    pub fn record_report(&self, report: &ValidationReport) {
        self.record_run(report.severity.as_str());
        self.set_dataset_shape(
            report.dataset_summary.num_rows,
            report.dataset_summary.num_columns,
        );
        for issue in &report.issues {
            self.record_issue(issue.category.as_str(), issue.severity.as_str());
        }
    }

    pub fn record_audit_appended(&self) {
        self.audit_appended_total.inc();
    }

    pub fn record_audit_failed(&self) {
        self.audit_failed_total.inc();
    }

    /// Start a run timer; the duration is observed when the guard drops
    pub fn start_timer(&self) -> RunTimer<'_> {
        RunTimer {
            start: Instant::now(),
            metrics: self,
        }
    }
}

/// RAII guard timing one validation run
pub struct RunTimer<'a> {
    start: Instant,
    metrics: &'a QualityMetrics,
}

impl<'a> RunTimer<'a> {
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl<'a> Drop for RunTimer<'a> {
    fn drop(&mut self) {
        self.metrics
            .observe_duration(self.start.elapsed().as_secs_f64());
    }
}

/// Registry holding all data quality metrics
pub struct QualityMetricsRegistry {
    registry: Arc<Registry>,
    quality: QualityMetrics,
}

impl QualityMetricsRegistry {
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let quality = QualityMetrics::new(Arc::clone(&registry))?;
        Ok(Self { registry, quality })
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn quality(&self) -> &QualityMetrics {
        &self.quality
    }

    /// Gather all metrics in Prometheus format
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics in the text exposition format
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ValidationError::InternalError(format!("Metrics are not UTF-8: {}", e)))
    }
}
