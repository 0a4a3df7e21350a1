// system-tests/tests/suites/single_file.rs
// ============================================================================
// Module: Single-File Round-Trip Tests
// Description: Import a fixture, export it to one file, compare structurally.
// Purpose: Ensure export(import(D)) is structurally equivalent to D.
// Dependencies: system-tests helpers, tag-cicd-harness
// ============================================================================

//! ## Overview
//! Invariants:
//! - Key order and integral float formatting do not affect equivalence.
//! - Array order does.
//! - A recursive inline export's provider root carries no `name` or `tagType`
//!   into the comparison.

use tag_cicd_harness::CollisionPolicy;

use crate::helpers;
use helpers::artifacts::TestReporter;
use helpers::harness::FULL_TAG_FIXTURE;
use helpers::harness::SINGLE_TAG_FIXTURE;
use helpers::harness::fixture;
use helpers::harness::live_harness;

#[test]
fn full_tag_file_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("full_tag_file_round_trips")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("full_tag_file_round_trips")?;
    scenario.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    let exported = scenario.export_single_file("single.json")?;
    scenario.compare_with_fixture(fixture(FULL_TAG_FIXTURE), &exported)?;

    reporter.finish(
        "pass",
        vec!["single-file export matches the full tag fixture".to_string()],
        vec![exported.display().to_string()],
    )?;
    Ok(())
}

#[test]
fn single_tag_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("single_tag_round_trips")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("single_tag_round_trips")?;
    let report = scenario.import_fixture(fixture(SINGLE_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    if report.status != 200 {
        return Err(format!("unexpected import status {}", report.status).into());
    }
    let exported = scenario.export_single_file("single-tag.json")?;
    scenario.compare_with_fixture(fixture(SINGLE_TAG_FIXTURE), &exported)?;

    reporter.finish(
        "pass",
        vec!["single memory tag survives import and export".to_string()],
        vec![exported.display().to_string()],
    )?;
    Ok(())
}

#[test]
fn reimport_with_overwrite_is_stable() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("reimport_with_overwrite_is_stable")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("reimport_with_overwrite_is_stable")?;
    scenario.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    scenario.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    let exported = scenario.export_single_file("reimport.json")?;
    scenario.compare_with_fixture(fixture(FULL_TAG_FIXTURE), &exported)?;

    reporter.finish(
        "pass",
        vec!["importing twice with overwrite leaves one copy of each tag".to_string()],
        vec![exported.display().to_string()],
    )?;
    Ok(())
}

#[test]
fn inline_export_matches_single_tag_import() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("inline_export_matches_single_tag_import")?;
    let harness = live_harness()?;
    let imported = harness.fixtures().load(fixture(SINGLE_TAG_FIXTURE))?;

    let mut scenario = harness.scenario("inline_export_matches_single_tag_import")?;
    let report = scenario.import_document(&imported, CollisionPolicy::Overwrite)?;
    if report.status != 200 {
        return Err(format!("unexpected import status {}", report.status).into());
    }
    let exported = scenario.export_inline()?;
    reporter.write_json("inline_export.json", &exported)?;
    scenario.compare_documents(&imported, &exported)?;

    reporter.finish(
        "pass",
        vec!["recursive inline export deep-equals the imported document".to_string()],
        vec!["inline_export.json".to_string()],
    )?;
    Ok(())
}
