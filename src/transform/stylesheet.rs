//! Conversion stylesheet
//!
//! The NUnit to JUnit mapping is an externally authored XSLT document. It is
//! read once and checked to be a usable transform definition before any report
//! is handed to the processor. The checked bytes are pinned to a private copy
//! that the processor reads for the rest of the run, so later changes to the
//! original file do not affect it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::TransformError;

/// Well-known location of the bundled stylesheet
pub const DEFAULT_STYLESHEET_PATH: &str = "/docs/conversionStyleSheet.xsl";

const XSLT_NAMESPACE: &[u8] = b"http://www.w3.org/1999/XSL/Transform";

/// A loaded, validated stylesheet. Immutable after construction.
///
/// The pinned copy is removed when the stylesheet is dropped.
#[derive(Debug)]
pub struct Stylesheet {
    path: PathBuf,
    pinned: NamedTempFile,
}

impl Stylesheet {
    /// Read and validate the stylesheet at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();
        let source = fs::read(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let stylesheet = Self::from_bytes(path, &source)?;
        debug!(
            "Loaded stylesheet {} ({} bytes) pinned at {}",
            path.display(),
            source.len(),
            stylesheet.pinned_path().display()
        );
        Ok(stylesheet)
    }

    /// Validate stylesheet bytes that were read elsewhere.
    pub fn from_bytes(path: impl Into<PathBuf>, source: &[u8]) -> Result<Self, TransformError> {
        let path = path.into();
        check_definition(source).map_err(|message| TransformError::Compile {
            path: path.clone(),
            message,
        })?;

        let pinned = pin(source).map_err(|source| TransformError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, pinned })
    }

    /// Where the stylesheet was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The validated copy handed to the processor
    pub fn pinned_path(&self) -> &Path {
        self.pinned.path()
    }
}

fn pin(source: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("nunit-to-junit-")
        .suffix(".xsl")
        .tempfile()?;
    file.write_all(source)?;
    file.flush()?;
    Ok(file)
}

/// The root must be an XSLT `stylesheet` or `transform` element, or a literal
/// result element carrying an XSLT `version` attribute. Names are matched by
/// namespace, whatever prefix binds it. The whole document must be well-formed.
fn check_definition(source: &[u8]) -> Result<(), String> {
    let mut reader = NsReader::from_reader(source);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut root_seen = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(tag)) => {
                if !root_seen {
                    check_root(&reader, &tag)?;
                    root_seen = true;
                }
                depth += 1;
            }
            Ok(Event::Empty(tag)) if !root_seen => {
                check_root(&reader, &tag)?;
                root_seen = true;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "{} (at byte {})",
                    err,
                    reader.buffer_position()
                ))
            }
        }
        buf.clear();
    }

    if !root_seen {
        return Err("document has no root element".to_string());
    }
    if depth > 0 {
        return Err("unexpected end of document".to_string());
    }
    Ok(())
}

fn is_xslt(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == XSLT_NAMESPACE)
}

fn check_root(reader: &NsReader<&[u8]>, tag: &BytesStart<'_>) -> Result<(), String> {
    let (ns, local) = reader.resolve_element(tag.name());
    if is_xslt(&ns) && matches!(local.as_ref(), b"stylesheet" | b"transform") {
        return Ok(());
    }

    let simplified = tag.attributes().with_checks(false).flatten().any(|attr| {
        let (ns, local) = reader.resolve_attribute(attr.key);
        is_xslt(&ns) && local.as_ref() == b"version"
    });
    if simplified {
        return Ok(());
    }

    Err(format!(
        "root element <{}> is not an XSLT stylesheet",
        String::from_utf8_lossy(tag.name().as_ref())
    ))
}
