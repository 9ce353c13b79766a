//! Configuration module
//!
//! Resolves the per-run settings from command-line flags, `PLUGIN_*`
//! environment variables and defaults, in that order of precedence.

pub mod env;

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::transform::{DEFAULT_PROCESSOR, DEFAULT_STYLESHEET_PATH};
use crate::utils::logger::LogLevel;
use env::EnvConfig;

/// Settings for one conversion run. Read-only once resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Args {
    /// Log level
    pub log_level: LogLevel,

    /// Glob pattern matching report files
    pub report_path: String,

    /// Fail the run when the pattern matches nothing
    pub fail_if_no_results: bool,

    /// Fail the run when any report records failed tests
    pub failed_tests_fail_build: bool,

    /// Conversion stylesheet
    pub stylesheet_path: PathBuf,

    /// XSLT processor program
    pub xslt_processor: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            report_path: String::new(),
            fail_if_no_results: false,
            failed_tests_fail_build: false,
            stylesheet_path: PathBuf::from(DEFAULT_STYLESHEET_PATH),
            xslt_processor: PathBuf::from(DEFAULT_PROCESSOR),
        }
    }
}

impl Args {
    pub fn new(report_path: impl Into<String>) -> Self {
        Self {
            report_path: report_path.into(),
            ..Self::default()
        }
    }

    pub fn with_fail_if_no_results(mut self, enabled: bool) -> Self {
        self.fail_if_no_results = enabled;
        self
    }

    pub fn with_failed_tests_fail_build(mut self, enabled: bool) -> Self {
        self.failed_tests_fail_build = enabled;
        self
    }

    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.stylesheet_path = path.into();
        self
    }

    /// Merge command-line flags over environment settings.
    ///
    /// An empty report path is accepted here; the locator rejects it when the
    /// run starts.
    pub fn resolve(cli: &Cli, env: &EnvConfig) -> Result<Self> {
        let defaults = Self::default();

        let log_level = match cli.log_level.as_deref().or(env.log_level.as_deref()) {
            Some(level) if !level.trim().is_empty() => LogLevel::from_str(level)
                .ok_or_else(|| anyhow::anyhow!("Unknown log level: {level}"))?,
            _ => defaults.log_level,
        };

        let report_path = cli
            .report_path
            .clone()
            .or_else(|| env.report_path.clone())
            .unwrap_or_default();

        let stylesheet_path = cli
            .stylesheet
            .clone()
            .or_else(|| env.stylesheet_path.as_ref().map(PathBuf::from))
            .unwrap_or(defaults.stylesheet_path);

        let xslt_processor = cli
            .xslt_processor
            .clone()
            .or_else(|| env.xslt_processor.as_ref().map(PathBuf::from))
            .unwrap_or(defaults.xslt_processor);

        Ok(Self {
            log_level,
            report_path,
            fail_if_no_results: cli
                .fail_if_no_results
                .or(env.fail_if_no_results)
                .unwrap_or(defaults.fail_if_no_results),
            failed_tests_fail_build: cli
                .failed_tests_fail_build
                .or(env.failed_tests_fail_build)
                .unwrap_or(defaults.failed_tests_fail_build),
            stylesheet_path,
            xslt_processor,
        })
    }
}
