//! nunit-to-junit - NUnit test result checker and JUnit converter
//!
//! A build step that fails the build on failed NUnit tests (if asked to) and
//! rewrites every matched report as JUnit XML for CI dashboards.
//!
//! ## Usage
//!
//! ```bash
//! # Convert every report under TestResults
//! nunit-to-junit --report-path 'TestResults/*.xml'
//!
//! # Fail the step on failed tests or on no reports at all
//! nunit-to-junit -r '**/TestResult.xml' --failed-tests-fail-build --fail-if-no-results
//!
//! # Configure through the plugin environment instead
//! PLUGIN_TEST_REPORT_PATH='out/*.xml' PLUGIN_FAILED_TESTS_FAIL_BUILD=true nunit-to-junit
//!
//! # Print a JSON summary of the run
//! nunit-to-junit -r 'out/*.xml' --summary-format json-pretty
//! ```

use anyhow::{anyhow, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, warn};

use nunit_to_junit::cli::Cli;
use nunit_to_junit::config::env::{print_env_help, EnvConfig};
use nunit_to_junit::config::Args;
use nunit_to_junit::error::{codes, exit_code};
use nunit_to_junit::output::{OutputFormat, SummaryFormatter};
use nunit_to_junit::pipeline::{Pipeline, RunContext};
use nunit_to_junit::transform::ExternalProcessor;
use nunit_to_junit::utils::logger::init_logger;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(codes::CONFIG_ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    if cli.print_env {
        print_env_help();
        return Ok(codes::SUCCESS);
    }

    let args = Args::resolve(&cli, &EnvConfig::load())?;
    let format = cli
        .summary_format
        .as_deref()
        .map(|f| OutputFormat::from_str(f).ok_or_else(|| anyhow!("Unknown summary format: {f}")))
        .transpose()?;

    init_logger(args.log_level);

    let ctx = RunContext::new(args);
    let cancel = ctx.cancel().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current report");
            cancel.trigger();
        }
    });

    let joined = run_blocking(move || {
        let processor = ExternalProcessor::new(&ctx.args.xslt_processor);
        let mut pipeline = Pipeline::new(&ctx, processor);
        let result = pipeline.run();
        (result, pipeline.into_summary())
    })
    .await;
    let (result, summary) = match joined {
        Ok(done) => done,
        Err(code) => return Ok(code),
    };

    if let Some(format) = format {
        println!("{}", SummaryFormatter::new(format).format(&summary));
    }

    Ok(match &result {
        Ok(()) => codes::SUCCESS,
        Err(err) => exit_code(err),
    })
}

/// Run the sequential pipeline on a blocking thread.
///
/// A task that panics yields the internal error exit code.
async fn run_blocking<T, F>(task: F) -> std::result::Result<T, u8>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| {
        error!("Conversion task failed: {err}");
        codes::INTERNAL_ERROR
    })
}
