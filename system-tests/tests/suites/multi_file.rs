// system-tests/tests/suites/multi_file.rs
// ============================================================================
// Module: Individual-Files Export Tests
// Description: Multi-file exports against single-file exports and each other.
// Purpose: Ensure both export shapes carry the same tags.
// Dependencies: system-tests helpers, tag-cicd-harness
// ============================================================================

//! ## Overview
//! Invariants:
//! - Flattening an individual-files export yields the single-file export's
//!   hierarchy.
//! - Repeated individual-files exports produce identical trees.

use tag_cicd_harness::CollisionPolicy;
use tag_cicd_harness::LeafMode;

use crate::helpers;
use helpers::artifacts::TestReporter;
use helpers::harness::FULL_TAG_FIXTURE;
use helpers::harness::display_paths;
use helpers::harness::fixture;
use helpers::harness::live_harness;

#[test]
fn individual_files_match_single_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("individual_files_match_single_file")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("individual_files_match_single_file")?;
    scenario.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    let single = scenario.export_single_file("multi-single.json")?;
    let tree = scenario.export_individual_files("multi-tags")?;
    scenario.compare_representations(&single, &tree)?;
    let fixture_path = harness.fixtures().resolve(fixture(FULL_TAG_FIXTURE));
    scenario.compare_representations(&fixture_path, &tree)?;

    reporter.finish(
        "pass",
        vec!["flattened tree matches both the single-file export and the fixture".to_string()],
        display_paths(&[single, tree]),
    )?;
    Ok(())
}

#[test]
fn repeated_individual_exports_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("repeated_individual_exports_are_identical")?;
    let harness = live_harness()?;

    let mut scenario = harness.scenario("repeated_individual_exports_are_identical")?;
    scenario.import_fixture(fixture(FULL_TAG_FIXTURE), CollisionPolicy::Overwrite)?;
    let first = scenario.export_individual_files("multi-tags-a")?;
    let second = scenario.export_individual_files("multi-tags-b")?;
    let compared = scenario.compare_trees(&first, &second, LeafMode::ByteExact)?;

    reporter.finish(
        "pass",
        vec![format!("{compared} files byte-identical across two exports")],
        display_paths(&[first, second]),
    )?;
    Ok(())
}
