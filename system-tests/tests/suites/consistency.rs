// system-tests/tests/suites/consistency.rs
// ============================================================================
// Module: Export Consistency Tests
// Description: Repeated exports of unchanged state are byte-identical.
// Purpose: Ensure the gateway's export serialization is deterministic.
// Dependencies: system-tests helpers, tag-cicd-harness
// ============================================================================

//! ## Overview
//! Invariants:
//! - Consecutive exports of the same state produce identical bytes.

use tag_cicd_harness::CollisionPolicy;

use crate::helpers;
use helpers::artifacts::TestReporter;
use helpers::harness::FULL_TAG_FIXTURE;
use helpers::harness::display_paths;
use helpers::harness::fixture;
use helpers::harness::live_harness;

/// Number of consecutive exports compared.
const EXPORT_COUNT: usize = 3;

#[test]
fn repeated_exports_are_byte_identical() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("repeated_exports_are_byte_identical")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("repeated_exports_are_byte_identical")?;
    scenario.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    let mut exports = Vec::with_capacity(EXPORT_COUNT);
    for index in 0..EXPORT_COUNT {
        exports.push(scenario.export_single_file(&format!("export_{index}.json"))?);
    }
    scenario.compare_files_identical(&exports)?;

    reporter.finish(
        "pass",
        vec![format!("{EXPORT_COUNT} consecutive exports are byte-identical")],
        display_paths(&exports),
    )?;
    Ok(())
}
