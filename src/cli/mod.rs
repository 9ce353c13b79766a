//! CLI argument parsing
//!
//! Every flag is optional; anything not given on the command line falls back
//! to the `PLUGIN_*` environment.

use clap::Parser;
use std::path::PathBuf;

/// Check NUnit test results and convert them to JUnit XML in place
#[derive(Parser, Debug, Default)]
#[command(name = "nunit-to-junit")]
#[command(version)]
#[command(about = "Check NUnit test results and convert them to JUnit XML in place")]
#[command(long_about = None)]
pub struct Cli {
    /// Glob pattern matching NUnit report files
    #[arg(short, long)]
    pub report_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Fail when no report file matches the pattern (`=false` to disable)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub fail_if_no_results: Option<bool>,

    /// Fail when any report records failed tests (`=false` to disable)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub failed_tests_fail_build: Option<bool>,

    /// XSLT stylesheet mapping NUnit to JUnit
    #[arg(long)]
    pub stylesheet: Option<PathBuf>,

    /// XSLT processor program
    #[arg(long)]
    pub xslt_processor: Option<PathBuf>,

    /// Print a run summary to stdout (text, summary, json, json-pretty)
    #[arg(long)]
    pub summary_format: Option<String>,

    /// Print recognised environment variables and exit
    #[arg(long)]
    pub print_env: bool,
}
