//! NUnit to JUnit conversion step
//!
//! Finds NUnit `test-run` reports with a glob pattern, decides from their
//! root counts whether any tests failed, and rewrites each report in place
//! as JUnit XML through an XSLT stylesheet.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod transform;
pub mod utils;
