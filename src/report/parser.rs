//! NUnit report decoding
//!
//! Reads a `test-run` document into [`TestRun`]. Only the shape the pipeline
//! needs is decoded: root counts, the `test-suite` children of the root and
//! the `test-case` children of those suites. Anything else is skipped but must
//! still be well-formed XML.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ParseError;
use crate::models::{TestCase, TestRun, TestSuite};

const ROOT: &[u8] = b"test-run";
const SUITE: &[u8] = b"test-suite";
const CASE: &[u8] = b"test-case";

/// Open and decode one NUnit report.
///
/// The file handle is dropped on every return path.
pub fn parse_report(path: &Path) -> Result<TestRun, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode(BufReader::new(file), path)
}

/// Decode an in-memory NUnit report. `path` is only used in error messages.
pub fn parse_report_bytes(bytes: &[u8], path: &Path) -> Result<TestRun, ParseError> {
    decode(bytes, path)
}

#[derive(Default)]
struct RunBuilder {
    run: Option<TestRun>,
    depth: usize,
    // A non-empty test-suite is open directly below the root
    in_suite: bool,
}

impl RunBuilder {
    fn open(&mut self, tag: &BytesStart<'_>, depth: usize, has_children: bool) -> Result<(), String> {
        let name = tag.local_name();

        match depth {
            1 => {
                if name.as_ref() != ROOT {
                    return Err(format!(
                        "expected root element <test-run>, found <{}>",
                        String::from_utf8_lossy(name.as_ref())
                    ));
                }
                self.run = Some(read_run(tag)?);
            }
            2 => {
                self.in_suite = false;
                if name.as_ref() == SUITE {
                    if let Some(run) = self.run.as_mut() {
                        run.suites.push(TestSuite::default());
                        self.in_suite = has_children;
                    }
                }
            }
            3 if self.in_suite && name.as_ref() == CASE => {
                let case = read_case(tag)?;
                if let Some(suite) = self.run.as_mut().and_then(|r| r.suites.last_mut()) {
                    suite.cases.push(case);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth <= 1 {
            self.in_suite = false;
        }
    }
}

fn decode<R: BufRead>(input: R, path: &Path) -> Result<TestRun, ParseError> {
    let format_error = |message: String| ParseError::Format {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut builder = RunBuilder::default();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(err) => {
                return Err(format_error(format!(
                    "{} (at byte {})",
                    err,
                    reader.buffer_position()
                )))
            }
        };

        match event {
            Event::Start(tag) => {
                builder.depth += 1;
                let depth = builder.depth;
                builder.open(&tag, depth, true).map_err(format_error)?;
            }
            Event::Empty(tag) => {
                let depth = builder.depth + 1;
                builder.open(&tag, depth, false).map_err(format_error)?;
                if builder.depth == 0 {
                    break;
                }
            }
            Event::End(_) => {
                builder.close();
                if builder.depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match builder.run {
        None => Err(format_error("document has no <test-run> root element".to_string())),
        Some(_) if builder.depth > 0 => Err(format_error(
            "unexpected end of document inside <test-run>".to_string(),
        )),
        Some(run) => Ok(run),
    }
}

fn read_run(tag: &BytesStart<'_>) -> Result<TestRun, String> {
    let mut run = TestRun::default();

    for attr in tag.attributes().with_checks(false) {
        let attr = attr.map_err(|err| format!("invalid attribute on <test-run>: {err}"))?;
        let value = attr
            .unescape_value()
            .map_err(|err| format!("invalid attribute value on <test-run>: {err}"))?;

        match attr.key.local_name().as_ref() {
            b"total" => run.total = parse_count("total", &value)?,
            b"passed" => run.passed = parse_count("passed", &value)?,
            b"failed" => run.failed = parse_count("failed", &value)?,
            b"result" => run.result = value.into_owned(),
            _ => {}
        }
    }

    Ok(run)
}

fn read_case(tag: &BytesStart<'_>) -> Result<TestCase, String> {
    let mut case = TestCase::default();

    for attr in tag.attributes().with_checks(false) {
        let attr = attr.map_err(|err| format!("invalid attribute on <test-case>: {err}"))?;
        if attr.key.local_name().as_ref() == b"result" {
            case.result = attr
                .unescape_value()
                .map_err(|err| format!("invalid attribute value on <test-case>: {err}"))?
                .into_owned();
        }
    }

    Ok(case)
}

/// Absent or blank counts read as zero; anything else must be an integer.
fn parse_count(name: &str, value: &str) -> Result<i64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| format!("attribute {name}=\"{value}\" is not an integer"))
}
