//! Error types and exit codes
//!
//! Parse errors are recovered per report by the pipeline. Everything else ends
//! the run and is mapped to a process exit code.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit codes for the converter binary.
pub mod codes {
    pub const SUCCESS: u8 = 0;
    pub const TESTS_FAILED: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
    pub const NO_RESULTS: u8 = 3;
    pub const TRANSFORM_FAILED: u8 = 4;
    /// The conversion task itself failed (panicked or was aborted).
    pub const INTERNAL_ERROR: u8 = 70;
    pub const CANCELLED: u8 = 130;
}

/// Failure to read or decode a single NUnit report.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read report {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed NUnit report {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },
}

impl ParseError {
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Io { path, .. } | ParseError::Format { path, .. } => path.as_path(),
        }
    }
}

/// Failure while converting a report with the stylesheet.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stylesheet {} could not be compiled: {message}", .path.display())]
    Compile { path: PathBuf, message: String },

    #[error("failed to apply stylesheet {}: {message}", .path.display())]
    Apply { path: PathBuf, message: String },
}

/// Terminal failure of a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid report path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no test results found matching '{0}', failing the build as PLUGIN_FAIL_IF_NO_RESULTS is set")]
    NoResults(String),

    #[error("build failed converting {} from NUnit to JUnit: {source}", .path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("tests failed in {failing} report(s), failing the build as PLUGIN_FAILED_TESTS_FAIL_BUILD is set")]
    TestsFailed { failing: usize },

    #[error("run cancelled after {processed} report(s), {remaining} not processed")]
    Cancelled { processed: usize, remaining: usize },
}

/// Map a pipeline error to its exit code.
pub fn exit_code(err: &PipelineError) -> u8 {
    match err {
        PipelineError::Configuration(_) | PipelineError::Pattern { .. } => codes::CONFIG_ERROR,
        PipelineError::NoResults(_) => codes::NO_RESULTS,
        PipelineError::Transform { .. } => codes::TRANSFORM_FAILED,
        PipelineError::TestsFailed { .. } => codes::TESTS_FAILED,
        PipelineError::Cancelled { .. } => codes::CANCELLED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code(&PipelineError::Configuration("empty".into())),
            codes::CONFIG_ERROR
        );
        assert_eq!(
            exit_code(&PipelineError::NoResults("*.xml".into())),
            codes::NO_RESULTS
        );
        assert_eq!(
            exit_code(&PipelineError::TestsFailed { failing: 2 }),
            codes::TESTS_FAILED
        );
        assert_eq!(
            exit_code(&PipelineError::Transform {
                path: PathBuf::from("a.xml"),
                source: TransformError::Apply {
                    path: PathBuf::from("style.xsl"),
                    message: "bad input".into(),
                },
            }),
            codes::TRANSFORM_FAILED
        );
        assert_eq!(
            exit_code(&PipelineError::Cancelled {
                processed: 1,
                remaining: 2
            }),
            codes::CANCELLED
        );
    }

    #[test]
    fn test_pattern_error_keeps_source() {
        use std::error::Error as _;

        let source = glob::Pattern::new("[").unwrap_err();
        let err = PipelineError::Pattern {
            pattern: "[".into(),
            source,
        };
        assert!(err.to_string().contains("'['"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_error_path() {
        let err = ParseError::Format {
            path: PathBuf::from("r.xml"),
            message: "no root element".into(),
        };
        assert_eq!(err.path(), Path::new("r.xml"));
        assert!(err.to_string().contains("r.xml"));
    }
}
