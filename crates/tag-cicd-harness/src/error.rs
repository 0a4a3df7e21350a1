// crates/tag-cicd-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Top-level error type for scenario execution.
// Purpose: Let scenario code propagate every component failure with `?`.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Each component owns its error enum. [`HarnessError`] wraps them so a
//! scenario terminates on the first failure with the component's context
//! intact. None of these are retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::config::ConfigError;
use crate::equivalence::ComparisonFailure;
use crate::fixtures::FixtureReadError;
use crate::gateway::GatewayError;
use crate::reset::ResetFailure;
use crate::scenario::ScenarioOrderError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Any failure that terminates a scenario.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Harness configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A fixture file is missing, unreadable, or not JSON.
    #[error(transparent)]
    Fixture(#[from] FixtureReadError),
    /// The gateway rejected a request or could not be reached.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The tag store could not be confirmed empty.
    #[error(transparent)]
    Reset(#[from] ResetFailure),
    /// Exported artifacts diverge from their reference.
    #[error(transparent)]
    Comparison(#[from] ComparisonFailure),
    /// Scenario operations were invoked out of sequence.
    #[error(transparent)]
    ScenarioOrder(#[from] ScenarioOrderError),
}
