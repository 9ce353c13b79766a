//! XSLT processors
//!
//! Applying a stylesheet is delegated to an [`XsltProcessor`]. The production
//! implementation drives an XSLT 1.0 command-line processor (`xsltproc`),
//! passing the report on stdin and collecting the converted document from
//! stdout. The processor reads the pinned copy of the stylesheet, never the
//! original file.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

use super::Stylesheet;
use crate::error::TransformError;

/// Default XSLT processor program
pub const DEFAULT_PROCESSOR: &str = "xsltproc";

// xsltproc: "failed to parse the stylesheet" / "error in the stylesheet"
const EXIT_STYLESHEET_PARSE: i32 = 4;
const EXIT_STYLESHEET_ERROR: i32 = 5;

/// Applies a compiled stylesheet to a document.
///
/// Implementations must be pure: the same stylesheet and input always produce
/// the same output bytes.
pub trait XsltProcessor {
    fn apply(&self, stylesheet: &Stylesheet, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Runs an external XSLT processor for every document.
#[derive(Clone, Debug)]
pub struct ExternalProcessor {
    program: PathBuf,
}

impl ExternalProcessor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn io_error(&self, source: std::io::Error) -> TransformError {
        TransformError::Io {
            path: self.program.clone(),
            source,
        }
    }
}

impl Default for ExternalProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSOR)
    }
}

impl XsltProcessor for ExternalProcessor {
    fn apply(&self, stylesheet: &Stylesheet, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        debug!(
            "Running {} with {}",
            self.program.display(),
            stylesheet.path().display()
        );

        let mut child = Command::new(&self.program)
            .arg("--nonet")
            .arg(stylesheet.pinned_path())
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.io_error(e))?;

        // Feed stdin from a separate thread so a large output cannot block the write.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.io_error(std::io::Error::other("stdin not captured")))?;
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            // A processor that exits early closes the pipe; its status carries the real error.
            let _ = writer.join();
            output
        })
        .map_err(|e| self.io_error(e))?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(EXIT_STYLESHEET_PARSE) | Some(EXIT_STYLESHEET_ERROR) => {
                Err(TransformError::Compile {
                    path: stylesheet.path().to_path_buf(),
                    message,
                })
            }
            code => {
                let status = match code {
                    Some(code) => format!("exited with status {code}"),
                    None => "terminated by signal".to_string(),
                };
                Err(TransformError::Apply {
                    path: stylesheet.path().to_path_buf(),
                    message: format!("{} {status}: {message}", self.program.display()),
                })
            }
        }
    }
}
