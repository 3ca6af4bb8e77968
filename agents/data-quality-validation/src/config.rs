//! Validator configuration
//!
//! Values are layered: built-in defaults, then environment variables, then
//! a configuration file, then command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ValidationError};

pub const ENV_MISSING_WARN: &str = "DQ_MISSING_WARN_THRESHOLD";
pub const ENV_MISSING_CRITICAL: &str = "DQ_MISSING_CRITICAL_THRESHOLD";
pub const ENV_IQR_MULTIPLIER: &str = "DQ_IQR_MULTIPLIER";
pub const ENV_NA_VALUES: &str = "DQ_NA_VALUES";

pub const DEFAULT_MISSING_WARN_THRESHOLD: f64 = 0.10;
pub const DEFAULT_MISSING_CRITICAL_THRESHOLD: f64 = 0.30;
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Thresholds and parsing options for a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Missing ratio at which a column is flagged as a warning
    pub missing_warn_threshold: f64,
    /// Missing ratio at which a column becomes blocking
    pub missing_critical_threshold: f64,
    /// Fence multiplier applied to the interquartile range
    pub outlier_iqr_multiplier: f64,
    /// Extra tokens treated as missing on load
    pub na_values: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            missing_warn_threshold: DEFAULT_MISSING_WARN_THRESHOLD,
            missing_critical_threshold: DEFAULT_MISSING_CRITICAL_THRESHOLD,
            outlier_iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            na_values: Vec::new(),
        }
    }
}

/// Partial configuration read from a file or the environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub missing_warn_threshold: Option<f64>,
    pub missing_critical_threshold: Option<f64>,
    pub outlier_iqr_multiplier: Option<f64>,
    pub na_values: Option<Vec<String>>,
}

impl ValidatorConfig {
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::new()
    }

    /// Apply every value present in `overrides`
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.missing_warn_threshold {
            self.missing_warn_threshold = v;
        }
        if let Some(v) = overrides.missing_critical_threshold {
            self.missing_critical_threshold = v;
        }
        if let Some(v) = overrides.outlier_iqr_multiplier {
            self.outlier_iqr_multiplier = v;
        }
        if let Some(v) = &overrides.na_values {
            self.na_values = v.clone();
        }
    }

    /// Check threshold ordering and ranges
    pub fn validate(&self) -> Result<()> {
        let warn = self.missing_warn_threshold;
        let critical = self.missing_critical_threshold;

        if !(0.0..=1.0).contains(&warn) {
            return Err(ValidationError::invalid_input(format!(
                "missing_warn_threshold must be within [0, 1], got {}",
                warn
            )));
        }
        if !(0.0..=1.0).contains(&critical) {
            return Err(ValidationError::invalid_input(format!(
                "missing_critical_threshold must be within [0, 1], got {}",
                critical
            )));
        }
        if warn > critical {
            return Err(ValidationError::invalid_input(format!(
                "missing_warn_threshold ({}) exceeds missing_critical_threshold ({})",
                warn, critical
            )));
        }
        if !self.outlier_iqr_multiplier.is_finite() || self.outlier_iqr_multiplier < 0.0 {
            return Err(ValidationError::invalid_input(format!(
                "outlier_iqr_multiplier must be a non-negative number, got {}",
                self.outlier_iqr_multiplier
            )));
        }
        Ok(())
    }
}

impl ConfigOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides from environment-style variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            missing_warn_threshold: parse_var(&lookup, ENV_MISSING_WARN)?,
            missing_critical_threshold: parse_var(&lookup, ENV_MISSING_CRITICAL)?,
            outlier_iqr_multiplier: parse_var(&lookup, ENV_IQR_MULTIPLIER)?,
            na_values: lookup(ENV_NA_VALUES).map(|raw| split_list(&raw)),
        })
    }

    /// Read overrides from a TOML, YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::file_error(format!("Cannot read config {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let overrides = match extension.as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(ValidationError::invalid_input(format!(
                    "Unsupported config format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };
        Ok(overrides)
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<f64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
            ValidationError::invalid_input(format!("{} is not a number: '{}'", key, raw))
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Builder for [`ValidatorConfig`]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    pub fn missing_warn_threshold(mut self, value: f64) -> Self {
        self.config.missing_warn_threshold = value;
        self
    }

    pub fn missing_critical_threshold(mut self, value: f64) -> Self {
        self.config.missing_critical_threshold = value;
        self
    }

    pub fn outlier_iqr_multiplier(mut self, value: f64) -> Self {
        self.config.outlier_iqr_multiplier = value;
        self
    }

    /// Add one extra missing-value token
    pub fn na_value(mut self, token: impl Into<String>) -> Self {
        self.config.na_values.push(token.into());
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ValidatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ValidatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where and whether validation runs are recorded in the audit trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    pub enabled: bool,
    pub log_path: PathBuf,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: PathBuf::from(audit_trail::AuditTrail::DEFAULT_PATH),
        }
    }
}

impl AuditSettings {
    /// Open the trail when auditing is enabled
    pub fn open_trail(&self) -> Result<Option<audit_trail::AuditTrail>> {
        if !self.enabled {
            tracing::debug!("Audit trail disabled for this run");
            return Ok(None);
        }
        Ok(Some(audit_trail::AuditTrail::open(&self.log_path)?))
    }
}
