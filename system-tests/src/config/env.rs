// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize run-root env parsing with strict UTF-8 validation.
// Dependencies: tag-cicd-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with the harness's strict readers. Invalid
//! UTF-8, empty values, and unknown boolean literals fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use tag_cicd_harness::ConfigError;
use tag_cicd_harness::config::parse_bool_env;
use tag_cicd_harness::config::read_env_nonempty;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override.
    RunRoot,
    /// Allow reusing a non-empty run root (`true`/`false` or `1`/`0`).
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Every key, for snapshot/restore in tests.
    pub const ALL: [Self; 2] = [Self::RunRoot, Self::AllowOverwrite];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "TAG_HARNESS_SYSTEM_TEST_RUN_ROOT",
            Self::AllowOverwrite => "TAG_HARNESS_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Allow reusing a non-empty run root.
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a value is not valid UTF-8, is empty,
    /// or is not a recognized boolean literal.
    pub fn load() -> Result<Self, ConfigError> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let allow_overwrite = read_env_nonempty(SystemTestEnv::AllowOverwrite.as_str())?;
        let allow_overwrite =
            parse_bool_env(SystemTestEnv::AllowOverwrite.as_str(), allow_overwrite.as_deref())?
                .unwrap_or(false);
        Ok(Self {
            run_root,
            allow_overwrite,
        })
    }
}
