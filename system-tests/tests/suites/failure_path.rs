// system-tests/tests/suites/failure_path.rs
// ============================================================================
// Module: Failure Path Tests
// Description: Malformed imports fail and leave the store untouched.
// Purpose: Ensure rejected imports surface as errors with no side effects.
// Dependencies: system-tests helpers, tag-cicd-harness
// ============================================================================

//! ## Overview
//! Invariants:
//! - A malformed import is an `ImportFailure` carrying the gateway's status
//!   and body.
//! - No tags are added by a failed import.
//! - Out-of-order scenario calls never reach the gateway.

use tag_cicd_harness::CollisionPolicy;
use tag_cicd_harness::GatewayError;
use tag_cicd_harness::HarnessError;
use tag_cicd_harness::ScenarioOperation;
use tag_cicd_harness::equivalence::is_empty_tag_document;

use crate::helpers;
use helpers::artifacts::TestReporter;
use helpers::harness::MALFORMED_FIXTURE;
use helpers::harness::fixture;
use helpers::harness::live_harness;

#[test]
fn malformed_import_fails_without_side_effects() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("malformed_import_fails_without_side_effects")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("malformed_import_fails_without_side_effects")?;
    let (status, body) =
        match scenario.import_fixture(fixture(MALFORMED_FIXTURE), CollisionPolicy::Overwrite) {
            Err(HarnessError::Gateway(GatewayError::ImportFailure {
                status,
                body,
            })) => (status, body),
            Err(other) => return Err(format!("unexpected import error: {other}").into()),
            Ok(report) => {
                return Err(format!("malformed import accepted with status {}", report.status).into());
            }
        };
    let observed = scenario.observe_tag_store()?;
    if !is_empty_tag_document(&observed) {
        return Err("failed import added tags".into());
    }
    reporter.write_text("import_error_body.txt", &body)?;

    reporter.finish(
        "pass",
        vec![format!("malformed import rejected with status {status}")],
        vec!["import_error_body.txt".to_string()],
    )?;
    Ok(())
}

#[test]
fn export_before_import_is_an_order_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("export_before_import_is_an_order_error")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("export_before_import_is_an_order_error")?;
    match scenario.export_single_file("never.json") {
        Err(HarnessError::ScenarioOrder(err)) if err.operation == ScenarioOperation::Export => {}
        Err(other) => return Err(format!("unexpected error: {other}").into()),
        Ok(path) => return Err(format!("export ran before import: {}", path.display()).into()),
    }

    reporter.finish("pass", vec!["export before import refused".to_string()], Vec::new())?;
    Ok(())
}
