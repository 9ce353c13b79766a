//! Failure verdict for a decoded report

use crate::models::TestRun;

/// True when the report records at least one failed test.
///
/// Only the root `failed` count is consulted. `total` and `passed` may be
/// inconsistent with it and are ignored.
pub fn has_failures(run: &TestRun) -> bool {
    run.failed > 0
}
