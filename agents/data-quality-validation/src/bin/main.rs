//! Data Quality Validation Agent CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate a dataset, treating "?" as missing, and export both reports
//! dq-validate validate --dataset heart_disease_uci.csv --na-value '?' --output-dir reports/
//!
//! # Query the audit trail
//! dq-validate audit query --agent DataQualityValidator --format json
//!
//! # Verify the audit trail hash chain
//! dq-validate audit verify
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - dataset meets all checks
//! - 1: Blocking issues found, or audit verification failed
//! - 2: Dataset usable with issues to review
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 10: Internal error

use clap::Parser;
use data_quality_validation::cli::LogFormat;
use data_quality_validation::{run_cli, DqCli};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool, format: LogFormat) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn main() {
    let cli = DqCli::parse();
    init_tracing(cli.verbose, cli.quiet, cli.log_format);

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
