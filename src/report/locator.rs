//! Report discovery
//!
//! Expands the configured glob pattern into report paths.

use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::PipelineError;

/// Expand `pattern` into the paths it matches.
///
/// No match is not an error and yields an empty list. Order follows the
/// directory listing; callers must not rely on it.
pub fn locate_reports(pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
    if pattern.is_empty() {
        return Err(PipelineError::Configuration(
            "report path must not be empty".to_string(),
        ));
    }

    let entries = glob::glob(pattern).map_err(|source| PipelineError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                debug!("Matched report candidate {}", path.display());
                files.push(path);
            }
            // Unreadable directories are skipped, as a plain glob would.
            Err(err) => warn!("Skipping unreadable path {}: {}", err.path().display(), err),
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_pattern_rejected() {
        let err = locate_reports("").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_malformed_pattern() {
        let err = locate_reports("reports/[.xml").unwrap_err();
        assert!(matches!(err, PipelineError::Pattern { .. }));
    }

    #[test]
    fn test_no_matches_is_empty() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/missing/*.xml", dir.path().display());
        assert!(locate_reports(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_matches_xml_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("passed.xml"), "<test-run/>").unwrap();
        fs::write(dir.path().join("failed.xml"), "<test-run/>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pattern = format!("{}/*.xml", dir.path().display());
        let mut files = locate_reports(&pattern).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![dir.path().join("failed.xml"), dir.path().join("passed.xml")]
        );
    }
}
