// crates/tag-cicd-harness/src/equivalence/debug.rs
// ============================================================================
// Module: Debug Artifacts
// Description: Best-effort persistence of divergent comparison inputs.
// Purpose: Leave both sides of a failed comparison on disk for inspection.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Artifacts land in one fixed directory under fixed names and overwrite the
//! previous failure's files. Write failures are logged as
//! `debug_artifact_write_failed` events and never replace the comparison
//! failure being reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde_json::Value;
use serde_json::json;

use crate::logging::EventOutcome;
use crate::logging::HarnessEvent;
use crate::logging::HarnessLogSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Expected-side artifact name.
pub const EXPECTED_FILE: &str = "expected.json";

/// Actual-side artifact name.
pub const ACTUAL_FILE: &str = "actual.json";

/// Failure description artifact name.
pub const FAILURE_FILE: &str = "failure.json";

// ============================================================================
// SECTION: Persistence
// ============================================================================

/// One failed comparison to persist.
pub(super) struct DebugRecord<'a> {
    /// Comparison mode label.
    pub(super) mode: &'a str,
    /// Scenario label, when known.
    pub(super) scenario: Option<&'a str>,
    /// Expected side.
    pub(super) expected: &'a Value,
    /// Actual side.
    pub(super) actual: &'a Value,
    /// Rendered failure.
    pub(super) failure: &'a str,
}

/// Writes `expected.json`, `actual.json`, and `failure.json` into `dir`.
pub(super) fn persist(dir: &Path, sink: &dyn HarnessLogSink, record: &DebugRecord<'_>) {
    if let Err(err) = fs::create_dir_all(dir) {
        report(sink, record.scenario, dir, &err.to_string());
        return;
    }
    let failure = json!({
        "mode": record.mode,
        "scenario": record.scenario,
        "error": record.failure,
    });
    for (name, value) in
        [(EXPECTED_FILE, record.expected), (ACTUAL_FILE, record.actual), (FAILURE_FILE, &failure)]
    {
        let path = dir.join(name);
        let written = serde_json::to_vec_pretty(value)
            .map_err(|err| err.to_string())
            .and_then(|bytes| fs::write(&path, bytes).map_err(|err| err.to_string()));
        if let Err(message) = written {
            report(sink, record.scenario, &path, &message);
        }
    }
}

/// Logs a swallowed write failure.
fn report(sink: &dyn HarnessLogSink, scenario: Option<&str>, path: &Path, message: &str) {
    let mut event = HarnessEvent::new("debug_artifact_write_failed", EventOutcome::Error)
        .path(path.display().to_string())
        .detail(message);
    if let Some(scenario) = scenario {
        event = event.scenario(scenario);
    }
    sink.record(&event);
}
