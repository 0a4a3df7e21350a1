// crates/tag-cicd-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the round-trip harness.
// Purpose: Provide typed access to gateway, fixture, and mount settings.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Harness configuration is read from an optional TOML file and then overlaid
//! with environment variables, so CI can point the same test binaries at a
//! different gateway without editing files.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod harness;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod env_tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::HarnessEnv;
pub use env::parse_bool_env;
pub use env::read_env_nonempty;
pub use env::read_env_strict;
pub use harness::ConfigError;
pub use harness::HarnessConfig;
pub use harness::PathMapping;
