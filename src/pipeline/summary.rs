//! Run summary
//!
//! Per-report outcomes and aggregated counts collected while a run executes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PipelineError;
use crate::models::TestRun;

/// Final outcome of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pending,
    Success,
    Failure,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pending => write!(f, "PENDING"),
            Verdict::Success => write!(f, "SUCCESS"),
            Verdict::Failure => write!(f, "FAILURE"),
        }
    }
}

/// What happened to one report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Passed,
    Failed,
    Skipped,
}

impl ReportStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ReportStatus::Passed => "✓",
            ReportStatus::Failed => "✗",
            ReportStatus::Skipped => "○",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Passed => write!(f, "PASS"),
            ReportStatus::Failed => write!(f, "FAIL"),
            ReportStatus::Skipped => write!(f, "SKIP"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub status: ReportStatus,
    pub total: Option<i64>,
    pub failed: Option<i64>,
    pub converted: bool,
    pub message: Option<String>,
}

/// Test counts summed over all parsed reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub report_path: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub files_found: usize,
    pub reports: Vec<ReportOutcome>,
    pub totals: Totals,
    pub any_failed: bool,
    pub verdict: Verdict,
    pub error: Option<String>,
}

impl RunSummary {
    pub fn new(report_path: impl Into<String>) -> Self {
        Self {
            report_path: report_path.into(),
            started_at: Utc::now(),
            duration_ms: 0,
            files_found: 0,
            reports: Vec::new(),
            totals: Totals::default(),
            any_failed: false,
            verdict: Verdict::Pending,
            error: None,
        }
    }

    pub(crate) fn record_skipped(&mut self, path: &Path, reason: impl Into<String>) {
        self.reports.push(ReportOutcome {
            path: path.to_path_buf(),
            status: ReportStatus::Skipped,
            total: None,
            failed: None,
            converted: false,
            message: Some(reason.into()),
        });
    }

    pub(crate) fn record_parsed(&mut self, path: &Path, run: &TestRun, failed: bool) {
        // Counts are taken from the report unchecked, so the sums saturate.
        self.totals.total = self.totals.total.saturating_add(run.total);
        self.totals.passed = self.totals.passed.saturating_add(run.passed);
        self.totals.failed = self.totals.failed.saturating_add(run.failed);
        if failed {
            self.any_failed = true;
        }

        self.reports.push(ReportOutcome {
            path: path.to_path_buf(),
            status: if failed {
                ReportStatus::Failed
            } else {
                ReportStatus::Passed
            },
            total: Some(run.total),
            failed: Some(run.failed),
            converted: false,
            message: None,
        });
    }

    pub(crate) fn record_converted(&mut self, path: &Path) {
        if let Some(outcome) = self.reports.iter_mut().rev().find(|r| r.path == path) {
            outcome.converted = true;
        }
    }

    pub(crate) fn finish(&mut self, elapsed: Duration, result: &Result<(), PipelineError>) {
        self.duration_ms = elapsed.as_millis() as u64;
        match result {
            Ok(()) => self.verdict = Verdict::Success,
            Err(err) => {
                self.verdict = Verdict::Failure;
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn parsed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status != ReportStatus::Skipped)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.count(ReportStatus::Skipped)
    }

    pub fn failing_count(&self) -> usize {
        self.count(ReportStatus::Failed)
    }

    pub fn converted_count(&self) -> usize {
        self.reports.iter().filter(|r| r.converted).count()
    }

    fn count(&self, status: ReportStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NUnit reports matching {}", self.report_path)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for report in &self.reports {
            write!(f, "  {} {} {}", report.status.symbol(), report.status, report.path.display())?;
            if report.converted {
                write!(f, " [converted]")?;
            }
            if let Some(msg) = &report.message {
                write!(f, " - {msg}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Files: {} | Parsed: {} | Skipped: {} | Converted: {}",
            self.files_found,
            self.parsed_count(),
            self.skipped_count(),
            self.converted_count()
        )?;
        writeln!(
            f,
            "Tests: {} | Pass: {} | Fail: {}",
            self.totals.total, self.totals.passed, self.totals.failed
        )?;
        write!(f, "Verdict: {} | Duration: {}ms", self.verdict, self.duration_ms)?;
        if let Some(err) = &self.error {
            write!(f, "\nError: {err}")?;
        }
        Ok(())
    }
}
