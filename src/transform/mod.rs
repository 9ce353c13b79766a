//! NUnit to JUnit conversion
//!
//! Applies the conversion stylesheet to a report and writes the result back
//! over the original file.
//!
//! The overwrite is destructive: no copy of the NUnit document is kept. Callers
//! that still need the original report after a run must copy it beforehand.

mod processor;
mod stylesheet;

pub use processor::{ExternalProcessor, XsltProcessor, DEFAULT_PROCESSOR};
pub use stylesheet::{Stylesheet, DEFAULT_STYLESHEET_PATH};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::TransformError;

/// Converts reports with one stylesheet for the lifetime of a run.
///
/// The stylesheet is loaded on first use and shared by every later
/// conversion. It is released when the engine is dropped.
pub struct TransformEngine<P> {
    processor: P,
    stylesheet_path: PathBuf,
    stylesheet: Option<Stylesheet>,
}

impl<P: XsltProcessor> TransformEngine<P> {
    pub fn new(processor: P, stylesheet_path: impl Into<PathBuf>) -> Self {
        Self {
            processor,
            stylesheet_path: stylesheet_path.into(),
            stylesheet: None,
        }
    }

    pub fn stylesheet_path(&self) -> &Path {
        &self.stylesheet_path
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Whether the stylesheet has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.stylesheet.is_some()
    }

    /// Convert document bytes without touching the filesystem (apart from
    /// loading the stylesheet).
    pub fn convert(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let stylesheet = load_once(&mut self.stylesheet, &self.stylesheet_path)?;
        self.processor.apply(stylesheet, input)
    }

    /// Convert the report at `path` and overwrite it with the result.
    ///
    /// Returns the number of bytes written.
    pub fn convert_in_place(&mut self, path: &Path) -> Result<usize, TransformError> {
        let input = fs::read(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let converted = self.convert(&input)?;

        fs::write(path, &converted).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            "Wrote converted report to {} ({} bytes)",
            path.display(),
            converted.len()
        );
        Ok(converted.len())
    }
}

fn load_once<'a>(
    slot: &'a mut Option<Stylesheet>,
    path: &Path,
) -> Result<&'a Stylesheet, TransformError> {
    let stylesheet = match slot.take() {
        Some(stylesheet) => stylesheet,
        None => Stylesheet::load(path)?,
    };
    Ok(slot.insert(stylesheet))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::report::parse_report_bytes;
    use std::cell::Cell;

    pub const STYLESHEET: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/test-run">
    <testsuites tests="{@total}" failures="{@failed}"/>
  </xsl:template>
</xsl:stylesheet>"#;

    /// Deterministic stand-in for an XSLT processor.
    ///
    /// Maps a `test-run` document to a one-line `testsuites` document and
    /// leaves documents it already produced unchanged. Fails like a real
    /// processor when the pinned stylesheet is gone.
    #[derive(Default)]
    pub struct FakeJunit {
        pub calls: Cell<usize>,
    }

    impl XsltProcessor for FakeJunit {
        fn apply(&self, stylesheet: &Stylesheet, input: &[u8]) -> Result<Vec<u8>, TransformError> {
            self.calls.set(self.calls.get() + 1);

            // Read what a real processor would read
            fs::metadata(stylesheet.pinned_path()).map_err(|source| TransformError::Io {
                path: stylesheet.pinned_path().to_path_buf(),
                source,
            })?;
            if input.starts_with(b"<testsuites") {
                return Ok(input.to_vec());
            }
            let run = parse_report_bytes(input, stylesheet.path()).map_err(|err| {
                TransformError::Apply {
                    path: stylesheet.path().to_path_buf(),
                    message: err.to_string(),
                }
            })?;
            Ok(format!(
                r#"<testsuites tests="{}" failures="{}"/>"#,
                run.total, run.failed
            )
            .into_bytes())
        }
    }
}
