// system-tests/tests/suites/reset_efficacy.rs
// ============================================================================
// Module: Reset Efficacy Tests
// Description: The tag store is empty after reset.
// Purpose: Ensure scenarios cannot observe each other's tags.
// Dependencies: system-tests helpers, tag-cicd-harness
// ============================================================================

//! ## Overview
//! Invariants:
//! - After reset, a full export holds no tags beyond an empty `_types_`.

use tag_cicd_harness::CollisionPolicy;
use tag_cicd_harness::equivalence::is_empty_tag_document;
use tag_cicd_harness::equivalence::remaining_tags;

use crate::helpers;
use helpers::artifacts::TestReporter;
use helpers::harness::FULL_TAG_FIXTURE;
use helpers::harness::fixture;
use helpers::harness::live_harness;

#[test]
fn reset_clears_imported_tags() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("reset_clears_imported_tags")?;
    let harness = live_harness()?;

    {
        let mut seed = harness.scenario("reset_clears_imported_tags_seed")?;
        seed.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
        let populated = seed.observe_tag_store()?;
        if is_empty_tag_document(&populated) {
            return Err("import left the tag store empty".into());
        }
    }

    let scenario = harness.scenario("reset_clears_imported_tags")?;
    let observed = scenario.observe_tag_store()?;
    if !is_empty_tag_document(&observed) {
        return Err(format!("tags survived reset: {}", remaining_tags(&observed).join(", ")).into());
    }
    reporter.write_json("observed.json", &observed)?;

    reporter.finish(
        "pass",
        vec!["tag store empty after reset".to_string()],
        vec!["observed.json".to_string()],
    )?;
    Ok(())
}

#[test]
fn reset_of_empty_store_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("reset_of_empty_store_succeeds")?;
    let harness = live_harness()?;

    drop(harness.scenario("reset_of_empty_store_succeeds_first")?);
    let scenario = harness.scenario("reset_of_empty_store_succeeds")?;
    let observed = scenario.observe_tag_store()?;
    if !is_empty_tag_document(&observed) {
        return Err("second reset left tags behind".into());
    }

    reporter.finish("pass", vec!["reset is idempotent".to_string()], Vec::new())?;
    Ok(())
}
