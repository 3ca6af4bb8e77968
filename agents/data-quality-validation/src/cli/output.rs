//! Output formatting for the dq-validate CLI
//!
//! Structured output in JSON and YAML, and human-readable tables with
//! severity-based coloring.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::io::{self, Write};

use audit_trail::{AuditEntry, VerificationReport};

use crate::engine::rules::{QualityIssue, Severity};
use crate::error::{Result, ValidationError};
use crate::report::FormattedReport;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Which report view to print
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum ReportView {
    /// Raw validation report
    Raw,
    /// Presentation report with recommendations
    #[default]
    Formatted,
}

/// Print any serializable value as JSON or YAML
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| ValidationError::SerializationError(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value)
                .map_err(|e| ValidationError::SerializationError(e.to_string()))?;
            println!("{}", yaml);
        }
        OutputFormat::Table => {
            return Err(ValidationError::InternalError(
                "table output requires a dedicated renderer".to_string(),
            ))
        }
    }
    Ok(())
}

fn colored_severity(severity: Severity) -> ColoredString {
    match severity {
        Severity::High => severity.as_str().red().bold(),
        Severity::Medium => severity.as_str().yellow().bold(),
        Severity::Low => severity.as_str().green().bold(),
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Render a formatted report and its flagged issues as a table
pub fn write_report_table<W: Write>(
    out: &mut W,
    report: &FormattedReport,
    issues: &[QualityIssue],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Data Quality Report".cyan().bold())?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(
        out,
        "[{}] {}",
        colored_severity(report.status.severity),
        report.status.summary
    )?;
    writeln!(
        out,
        "Dataset: {} rows x {} columns",
        report.dataset_overview.rows, report.dataset_overview.columns
    )?;
    writeln!(out)?;

    let missing = &report.data_quality.missing_values;
    writeln!(
        out,
        "{} ({} column(s))",
        "Missing values:".cyan().bold(),
        missing.columns_with_missing
    )?;
    for stat in &missing.details {
        writeln!(
            out,
            "  {:<24} {:>8} {:>9}",
            stat.column,
            stat.missing_count,
            percent(stat.ratio)
        )?;
    }

    let types = &report.data_quality.type_issues;
    writeln!(out, "{} ({})", "Type issues:".cyan().bold(), types.count)?;
    for issue in &types.details {
        writeln!(
            out,
            "  {:<24} {} ({} offending)",
            issue.column, issue.message, issue.offending_count
        )?;
    }

    let anomalies = &report.anomaly_analysis;
    writeln!(
        out,
        "{} ({}): {}",
        "Anomalies".cyan().bold(),
        anomalies.method,
        anomalies.summary
    )?;
    for stat in &anomalies.details {
        writeln!(
            out,
            "  {:<24} {:>4} outlier(s) {:>9}  outside [{:.4}, {:.4}]",
            stat.column,
            stat.count,
            percent(stat.percentage),
            stat.lower_bound,
            stat.upper_bound
        )?;
    }

    if !report.blocking_issues.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Blocking issues:".red().bold())?;
        for issue in &report.blocking_issues {
            writeln!(out, "  {} {}", "x".red(), issue)?;
        }
    }

    if !issues.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Findings:".cyan().bold())?;
        writeln!(out, "{}", "-".repeat(60))?;
        for (index, issue) in issues.iter().enumerate() {
            writeln!(
                out,
                "{:>3}. [{}] {} ({})",
                index + 1,
                colored_severity(issue.severity),
                issue.column,
                issue.rule_id
            )?;
            writeln!(out, "     {}", issue.message)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", "Recommendations:".cyan().bold())?;
    for recommendation in &report.recommendations {
        writeln!(out, "  - {}", recommendation)?;
    }
    out.flush()
}

/// Render audit entries one per block
pub fn write_entries_table<W: Write>(out: &mut W, entries: &[AuditEntry]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Audit Trail".cyan().bold())?;
    writeln!(out, "{}", "=".repeat(60))?;

    if entries.is_empty() {
        writeln!(out, "{}", "No matching entries".dimmed())?;
        return out.flush();
    }

    for entry in entries {
        writeln!(
            out,
            "#{:<5} {}  {} / {}",
            entry.sequence,
            entry.timestamp.to_rfc3339().dimmed(),
            entry.agent_name.bold(),
            entry.action_type
        )?;
        if let Some(notes) = &entry.notes {
            writeln!(out, "       notes: {}", notes)?;
        }
        for step in &entry.reasoning {
            writeln!(out, "       - {}: {}", step.check, step.conclusion)?;
        }
    }
    writeln!(out)?;
    writeln!(out, "{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" })?;
    out.flush()
}

/// Render the outcome of a chain verification
pub fn write_verification_table<W: Write>(
    out: &mut W,
    report: &VerificationReport,
) -> io::Result<()> {
    if report.valid {
        writeln!(
            out,
            "{} Audit trail intact ({} entries verified)",
            "+".green(),
            report.entries_checked
        )?;
    } else {
        writeln!(
            out,
            "{} Audit trail broken at line {}: {}",
            "x".red(),
            report
                .broken_at_line
                .map(|line| line.to_string())
                .unwrap_or_else(|| "?".to_string()),
            report.reason.as_deref().unwrap_or("unknown reason")
        )?;
        writeln!(out, "  {} entries verified before the break", report.entries_checked)?;
    }
    out.flush()
}
