// crates/tag-cicd-harness/src/lib.rs
// ============================================================================
// Module: Tag CI/CD Harness Library
// Description: Round-trip harness for the gateway tag import/export service.
// Purpose: Provide fixture loading, gateway calls, state reset, and comparison.
// Dependencies: reqwest, serde, serde_json, thiserror, toml, url, walkdir
// ============================================================================

//! ## Overview
//! `tag-cicd-harness` drives a live gateway's tag import and export endpoints
//! with known fixture documents and checks that what comes back out is the
//! same tags that went in. Scenarios run strictly one at a time, and every
//! scenario starts by clearing the gateway tag store.
//!
//! The pipeline is `reset → import → export (×N) → compare`, enforced by
//! [`Scenario`]. Comparison covers structural JSON equality, byte-exact file
//! identity, and directory-tree equivalence for individual-file exports.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod equivalence;
pub mod error;
pub mod fixtures;
pub mod gateway;
pub mod logging;
pub mod reset;
pub mod scenario;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::HarnessConfig;
pub use config::PathMapping;
pub use equivalence::ComparisonFailure;
pub use equivalence::EquivalenceChecker;
pub use equivalence::LeafMode;
pub use error::HarnessError;
pub use fixtures::FixtureLoader;
pub use fixtures::FixtureReadError;
pub use gateway::CollisionPolicy;
pub use gateway::ExportMode;
pub use gateway::ExportRequest;
pub use gateway::GatewayClient;
pub use gateway::GatewayError;
pub use gateway::ImportPayload;
pub use logging::HarnessEvent;
pub use logging::HarnessLogSink;
pub use reset::ResetController;
pub use reset::ResetFailure;
pub use scenario::Harness;
pub use scenario::Scenario;
pub use scenario::ScenarioOperation;
pub use scenario::ScenarioOrderError;
pub use scenario::ScenarioPhase;
