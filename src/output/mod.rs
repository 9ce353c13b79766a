//! Output formatting module
//!
//! Renders the run summary printed at the end of a run.

mod formatter;

pub use formatter::{OutputFormat, SummaryFormatter};
