//! Data models for NUnit test results
//!
//! Value types decoded from a `test-run` report.

mod test_run;

pub use test_run::{TestCase, TestRun, TestSuite};
