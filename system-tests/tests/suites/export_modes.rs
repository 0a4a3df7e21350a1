// system-tests/tests/suites/export_modes.rs
// ============================================================================
// Module: Export Mode Listing Tests
// Description: The gateway advertises every export mode the harness uses.
// Purpose: Catch gateway builds that dropped or renamed an export mode.
// Dependencies: system-tests helpers, tag-cicd-harness
// ============================================================================

use tag_cicd_harness::ExportMode;

use crate::helpers;
use helpers::artifacts::TestReporter;
use helpers::harness::live_harness;

#[test]
fn gateway_lists_known_export_modes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("gateway_lists_known_export_modes")?;
    let harness = live_harness()?;

    let modes = harness.client().export_modes()?;
    for expected in [ExportMode::SingleFile, ExportMode::IndividualFiles, ExportMode::StructuredByType] {
        if !modes.iter().any(|mode| ExportMode::from_code(&mode.code) == Some(expected)) {
            return Err(format!("gateway does not list export mode {}", expected.code()).into());
        }
    }

    reporter.finish(
        "pass",
        modes.iter().map(|mode| format!("{}: {}", mode.code, mode.name)).collect(),
        Vec::new(),
    )?;
    Ok(())
}
