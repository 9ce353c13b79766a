//! Conversion pipeline
//!
//! Locates NUnit reports, checks each for failed tests, converts it to JUnit
//! in place and turns the accumulated state into a single verdict.
//!
//! A report that cannot be read or decoded is logged and skipped. A report
//! that cannot be converted aborts the whole run.

mod cancel;
mod summary;

pub use cancel::CancelFlag;
pub use summary::{ReportOutcome, ReportStatus, RunSummary, Totals, Verdict};

use std::path::Path;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Span};

use crate::config::Args;
use crate::error::PipelineError;
use crate::report::{has_failures, locate_reports, parse_report};
use crate::transform::{TransformEngine, XsltProcessor};

/// Everything a run needs, built once by the caller and passed by reference.
pub struct RunContext {
    pub args: Args,
    cancel: CancelFlag,
    span: Span,
}

impl RunContext {
    pub fn new(args: Args) -> Self {
        let span = info_span!(
            "run",
            report_path = %args.report_path,
            fail_if_no_results = args.fail_if_no_results,
            failed_tests_fail_build = args.failed_tests_fail_build,
        );
        Self {
            args,
            cancel: CancelFlag::new(),
            span,
        }
    }

    /// Use a cancellation flag owned by the caller
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// One run over the reports matched by the configured pattern.
pub struct Pipeline<'a, P> {
    ctx: &'a RunContext,
    engine: TransformEngine<P>,
    summary: RunSummary,
}

impl<'a, P: XsltProcessor> Pipeline<'a, P> {
    pub fn new(ctx: &'a RunContext, processor: P) -> Self {
        Self {
            ctx,
            engine: TransformEngine::new(processor, &ctx.args.stylesheet_path),
            summary: RunSummary::new(&ctx.args.report_path),
        }
    }

    /// Consume the pipeline, releasing the stylesheet, and keep the summary.
    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    /// Execute the run. The summary is complete whatever the outcome.
    pub fn run(&mut self) -> Result<(), PipelineError> {
        let ctx = self.ctx;
        let _entered = ctx.span().enter();
        let start = Instant::now();

        info!("Starting NUnit to JUnit conversion");
        let result = self.execute();
        self.summary.finish(start.elapsed(), &result);

        match &result {
            Ok(()) => info!(
                "Conversion completed: {} converted, {} skipped",
                self.summary.converted_count(),
                self.summary.skipped_count()
            ),
            Err(err) => error!("{}", err),
        }
        result
    }

    fn execute(&mut self) -> Result<(), PipelineError> {
        let ctx = self.ctx;
        let args = &ctx.args;

        let files = match locate_reports(&args.report_path) {
            Ok(files) => files,
            Err(err) => {
                error!("Error finding test files");
                return Err(err);
            }
        };

        info!("Found {} test report file(s)", files.len());
        self.summary.files_found = files.len();

        if files.is_empty() {
            if args.fail_if_no_results {
                return Err(PipelineError::NoResults(args.report_path.clone()));
            }
            warn!("No test results found, but failing the build is not configured");
        }

        let mut any_failed = false;
        for (processed, file) in files.iter().enumerate() {
            if ctx.cancel().is_cancelled() {
                return Err(PipelineError::Cancelled {
                    processed,
                    remaining: files.len() - processed,
                });
            }
            if self.process(file)? {
                any_failed = true;
            }
        }

        if any_failed && args.failed_tests_fail_build {
            return Err(PipelineError::TestsFailed {
                failing: self.summary.failing_count(),
            });
        }
        if any_failed {
            warn!("Tests failed, but failing the build is not configured");
        }

        Ok(())
    }

    /// Returns whether the report records failed tests.
    fn process(&mut self, file: &Path) -> Result<bool, PipelineError> {
        let run = match parse_report(file) {
            Ok(run) => run,
            Err(err) => {
                error!("Error processing test result file {}: {}", file.display(), err);
                self.summary.record_skipped(file, err.to_string());
                return Ok(false);
            }
        };

        let failed = has_failures(&run);
        self.summary.record_parsed(file, &run, failed);
        if failed {
            warn!("Test results indicate failure in file: {}", file.display());
        }

        match self.engine.convert_in_place(file) {
            Ok(_) => {
                info!("Converted {} to JUnit", file.display());
                self.summary.record_converted(file);
                Ok(failed)
            }
            Err(source) => {
                error!("Conversion of {} failed: {}", file.display(), source);
                Err(PipelineError::Transform {
                    path: file.to_path_buf(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::transform::testing::{FakeJunit, STYLESHEET};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    const PASSED: &str = r#"<test-run total="2" passed="2" failed="0" result="Passed">
  <test-suite><test-case result="Passed"/><test-case result="Passed"/></test-suite>
</test-run>"#;
    const FAILED: &str = r#"<test-run total="5" passed="2" failed="3" result="Failed">
  <test-suite><test-case result="Failed"/></test-suite>
</test-run>"#;

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            fs::create_dir(dir.path().join("reports")).unwrap();
            fs::write(dir.path().join("conversionStyleSheet.xsl"), STYLESHEET).unwrap();
            Self { dir }
        }

        fn report(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join("reports").join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn args(&self) -> Args {
            Args::new(format!("{}/reports/*.xml", self.dir.path().display()))
                .with_stylesheet(self.dir.path().join("conversionStyleSheet.xsl"))
        }
    }

    fn run(ctx: &RunContext) -> (Result<(), PipelineError>, RunSummary) {
        let mut pipeline = Pipeline::new(ctx, FakeJunit::default());
        let result = pipeline.run();
        (result, pipeline.into_summary())
    }

    fn is_junit(path: &Path) -> bool {
        fs::read_to_string(path).unwrap().starts_with("<testsuites")
    }

    #[test]
    fn test_all_passed() {
        let ws = Workspace::new();
        let a = ws.report("a.xml", PASSED);
        let b = ws.report("b.xml", PASSED);

        let ctx = RunContext::new(ws.args().with_failed_tests_fail_build(true));
        let (result, summary) = run(&ctx);

        assert!(result.is_ok());
        assert!(is_junit(&a) && is_junit(&b));
        assert_eq!(summary.verdict, Verdict::Success);
        assert_eq!(summary.converted_count(), 2);
        assert!(!summary.any_failed);
    }

    #[test]
    fn test_failures_fail_build_after_converting_everything() {
        let ws = Workspace::new();
        let reports = [
            ws.report("one.xml", PASSED),
            ws.report("two.xml", FAILED),
            ws.report("three.xml", PASSED),
        ];

        let ctx = RunContext::new(ws.args().with_failed_tests_fail_build(true));
        let (result, summary) = run(&ctx);

        assert!(matches!(
            result,
            Err(PipelineError::TestsFailed { failing: 1 })
        ));
        for report in &reports {
            assert!(is_junit(report), "{} not converted", report.display());
        }
        assert_eq!(summary.files_found, 3);
        assert_eq!(summary.converted_count(), 3);
        assert_eq!(summary.totals.failed, 3);
        assert_eq!(summary.verdict, Verdict::Failure);
    }

    #[test]
    fn test_failures_tolerated_without_policy() {
        let ws = Workspace::new();
        ws.report("failed.xml", FAILED);

        let ctx = RunContext::new(ws.args());
        let (result, summary) = run(&ctx);

        assert!(result.is_ok());
        assert!(summary.any_failed);
        assert_eq!(summary.failing_count(), 1);
    }

    #[test]
    fn test_no_files_succeeds_by_default() {
        let ws = Workspace::new();

        let ctx = RunContext::new(ws.args());
        let (result, summary) = run(&ctx);

        assert!(result.is_ok());
        assert_eq!(summary.files_found, 0);
        assert_eq!(summary.converted_count(), 0);
    }

    #[test]
    fn test_no_files_with_fail_if_no_results() {
        let ws = Workspace::new();

        let ctx = RunContext::new(ws.args().with_fail_if_no_results(true));
        let (result, _) = run(&ctx);

        assert!(matches!(result, Err(PipelineError::NoResults(_))));
    }

    #[test]
    fn test_malformed_report_skipped() {
        let ws = Workspace::new();
        let broken = ws.report("broken.xml", "<test-run failed=\"1\"><test-suite>");
        let good = ws.report("good.xml", PASSED);

        let ctx = RunContext::new(ws.args().with_failed_tests_fail_build(true));
        let (result, summary) = run(&ctx);

        // The broken report claims a failure but is never evaluated
        assert!(result.is_ok());
        assert!(!summary.any_failed);
        assert_eq!(summary.skipped_count(), 1);
        assert!(is_junit(&good));
        assert_eq!(
            fs::read_to_string(&broken).unwrap(),
            "<test-run failed=\"1\"><test-suite>"
        );
    }

    #[test]
    fn test_unreadable_match_skipped() {
        let ws = Workspace::new();
        // A directory matching the pattern cannot be read as a report
        fs::create_dir(ws.dir.path().join("reports").join("nested.xml")).unwrap();
        ws.report("good.xml", PASSED);

        let ctx = RunContext::new(ws.args());
        let (result, summary) = run(&ctx);

        assert!(result.is_ok());
        assert_eq!(summary.files_found, 2);
        assert_eq!(summary.skipped_count(), 1);
        assert_eq!(summary.converted_count(), 1);
    }

    #[test]
    fn test_missing_stylesheet_aborts_on_first_file() {
        let ws = Workspace::new();
        let a = ws.report("a.xml", PASSED);
        let b = ws.report("b.xml", PASSED);

        // failedTestsFailBuild is off: the conversion failure is fatal anyway
        let args = ws.args().with_stylesheet(ws.dir.path().join("missing.xsl"));
        let ctx = RunContext::new(args);
        let (result, summary) = run(&ctx);

        match result {
            Err(PipelineError::Transform {
                source: TransformError::Io { .. },
                ..
            }) => {}
            other => panic!("expected transform error, got {other:?}"),
        }
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.converted_count(), 0);
        assert_eq!(fs::read_to_string(&a).unwrap(), PASSED);
        assert_eq!(fs::read_to_string(&b).unwrap(), PASSED);
    }

    #[test]
    fn test_invalid_stylesheet_is_transform_error() {
        let ws = Workspace::new();
        ws.report("a.xml", PASSED);
        let bad = ws.dir.path().join("bad.xsl");
        fs::write(&bad, "<not-a-stylesheet/>").unwrap();

        let ctx = RunContext::new(ws.args().with_stylesheet(bad));
        let (result, _) = run(&ctx);

        assert!(matches!(
            result,
            Err(PipelineError::Transform {
                source: TransformError::Compile { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_failure_flag_is_monotonic() {
        let ws = Workspace::new();
        ws.report("a-failed.xml", FAILED);
        for i in 0..4 {
            ws.report(&format!("b-passed-{i}.xml"), PASSED);
        }

        let ctx = RunContext::new(ws.args().with_failed_tests_fail_build(true));
        let (result, summary) = run(&ctx);

        assert!(matches!(result, Err(PipelineError::TestsFailed { .. })));
        assert!(summary.any_failed);
        assert_eq!(summary.converted_count(), 5);
    }

    #[test]
    fn test_huge_counts_reach_a_verdict() {
        let ws = Workspace::new();
        let huge = r#"<test-run total="9223372036854775807" passed="9223372036854775807" failed="0" result="Passed"/>"#;
        ws.report("a.xml", huge);
        ws.report("b.xml", huge);

        let ctx = RunContext::new(ws.args());
        let (result, summary) = run(&ctx);

        assert!(result.is_ok());
        assert_eq!(summary.verdict, Verdict::Success);
        assert_eq!(summary.totals.total, i64::MAX);
        assert_eq!(summary.converted_count(), 2);
    }

    #[test]
    fn test_empty_pattern() {
        let ctx = RunContext::new(Args::default().with_fail_if_no_results(true));
        let (result, summary) = run(&ctx);

        assert!(matches!(result, Err(PipelineError::Configuration(_))));
        assert_eq!(summary.verdict, Verdict::Failure);
    }

    #[test]
    fn test_malformed_pattern() {
        let ctx = RunContext::new(Args::new("reports/[.xml"));
        let (result, _) = run(&ctx);

        assert!(matches!(result, Err(PipelineError::Pattern { .. })));
    }

    #[test]
    fn test_cancelled_before_first_report() {
        let ws = Workspace::new();
        let a = ws.report("a.xml", PASSED);
        ws.report("b.xml", PASSED);

        let cancel = CancelFlag::new();
        cancel.trigger();
        let ctx = RunContext::new(ws.args()).with_cancel(cancel);
        let (result, summary) = run(&ctx);

        assert!(matches!(
            result,
            Err(PipelineError::Cancelled {
                processed: 0,
                remaining: 2
            })
        ));
        assert_eq!(summary.converted_count(), 0);
        assert_eq!(fs::read_to_string(&a).unwrap(), PASSED);
    }

    #[test]
    fn test_stylesheet_loaded_once_per_run() {
        let ws = Workspace::new();
        for i in 0..3 {
            ws.report(&format!("r{i}.xml"), PASSED);
        }

        let ctx = RunContext::new(ws.args());
        let mut pipeline = Pipeline::new(&ctx, FakeJunit::default());
        pipeline.run().unwrap();

        assert!(pipeline.engine.is_loaded());
        assert_eq!(pipeline.engine.processor().calls.get(), 3);
    }
}
