// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Live Harness Helpers
// Description: Harness construction and fixture names for live scenarios.
// Purpose: Build the harness from `TAG_HARNESS_*` configuration.
// Dependencies: tag-cicd-harness
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use tag_cicd_harness::Harness;
use tag_cicd_harness::HarnessError;

/// Composite export covering folders, atomic tags, UDT definitions, and
/// UDT instances.
pub const FULL_TAG_FIXTURE: &str = "full-tag-export.json";

/// One memory tag at the provider root.
pub const SINGLE_TAG_FIXTURE: &str = "single-tag.json";

/// Truncated JSON the gateway must refuse.
pub const MALFORMED_FIXTURE: &str = "malformed.json";

/// Builds the harness from the environment.
pub fn live_harness() -> Result<Harness, HarnessError> {
    Harness::from_env()
}

/// Returns the fixture path for `name`.
pub fn fixture(name: &str) -> &Path {
    Path::new(name)
}

/// Renders paths for summary artifacts.
pub fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|path| path.display().to_string()).collect()
}
