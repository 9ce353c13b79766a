//! NUnit report handling
//!
//! Discovery of report files, decoding of their contents and the pass/fail
//! verdict for a single report.

mod evaluator;
mod locator;
mod parser;

pub use evaluator::has_failures;
pub use locator::locate_reports;
pub use parser::{parse_report, parse_report_bytes};
