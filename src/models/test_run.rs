//! NUnit `test-run` models
//!
//! Defines the decoded report summary, its suites and cases.

use serde::Serialize;
use std::fmt;

/// Root summary of one NUnit report
///
/// Counts are kept exactly as written in the report. `failed` is the only
/// value the pipeline acts on; `result` and the per-case results are not
/// cross-checked against it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TestRun {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub result: String,
    pub suites: Vec<TestSuite>,
}

impl TestRun {
    pub fn new(total: i64, passed: i64, failed: i64, result: impl Into<String>) -> Self {
        Self {
            total,
            passed,
            failed,
            result: result.into(),
            suites: Vec::new(),
        }
    }
}

impl fmt::Display for TestRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Result: {}",
            self.total, self.passed, self.failed, self.result
        )
    }
}

/// A `test-suite` element directly below `test-run`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    pub cases: Vec<TestCase>,
}

/// A `test-case` element of a suite
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub result: String,
}

impl TestCase {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }
}
