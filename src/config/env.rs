//! Environment variable configuration
//!
//! The converter runs as a CI plugin step, so its settings normally arrive as
//! `PLUGIN_*` environment variables.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "PLUGIN";

/// Settings read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Log level from PLUGIN_LOG_LEVEL
    pub log_level: Option<String>,
    /// Report glob from PLUGIN_TEST_REPORT_PATH
    pub report_path: Option<String>,
    /// From PLUGIN_FAIL_IF_NO_RESULTS
    pub fail_if_no_results: Option<bool>,
    /// From PLUGIN_FAILED_TESTS_FAIL_BUILD
    pub failed_tests_fail_build: Option<bool>,
    /// Stylesheet location from PLUGIN_STYLESHEET_PATH
    pub stylesheet_path: Option<String>,
    /// Processor program from PLUGIN_XSLT_PROCESSOR
    pub xslt_processor: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            log_level: get_env("LOG_LEVEL"),
            report_path: get_env("TEST_REPORT_PATH"),
            fail_if_no_results: get_env_bool("FAIL_IF_NO_RESULTS"),
            failed_tests_fail_build: get_env_bool("FAILED_TESTS_FAIL_BUILD"),
            stylesheet_path: get_env("STYLESHEET_PATH"),
            xslt_processor: get_env("XSLT_PROCESSOR"),
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.var("LOG_LEVEL", level)
    }

    pub fn report_path(self, pattern: impl Into<String>) -> Self {
        self.var("TEST_REPORT_PATH", pattern)
    }

    pub fn fail_if_no_results(self, value: impl Into<String>) -> Self {
        self.var("FAIL_IF_NO_RESULTS", value)
    }

    pub fn failed_tests_fail_build(self, value: impl Into<String>) -> Self {
        self.var("FAILED_TESTS_FAIL_BUILD", value)
    }

    pub fn stylesheet_path(self, path: impl Into<String>) -> Self {
        self.var("STYLESHEET_PATH", path)
    }

    pub fn xslt_processor(self, program: impl Into<String>) -> Self {
        self.var("XSLT_PROCESSOR", program)
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let mut previous = Vec::with_capacity(self.vars.len());
        for (key, value) in self.vars {
            previous.push((key.clone(), env::var(&key).ok()));
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all PLUGIN environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_TEST_REPORT_PATH         Glob pattern matching NUnit report files (required)");
    println!("  {ENV_PREFIX}_LOG_LEVEL                Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_FAIL_IF_NO_RESULTS       Fail when no report matches (true/false)");
    println!("  {ENV_PREFIX}_FAILED_TESTS_FAIL_BUILD  Fail when any report records failed tests (true/false)");
    println!("  {ENV_PREFIX}_STYLESHEET_PATH          NUnit to JUnit XSLT stylesheet");
    println!("  {ENV_PREFIX}_XSLT_PROCESSOR           XSLT processor program (default: xsltproc)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_TEST_REPORT_PATH='build/test-results/*.xml'");
    println!("  export {ENV_PREFIX}_FAILED_TESTS_FAIL_BUILD=true");
    println!("  nunit-to-junit");
}
