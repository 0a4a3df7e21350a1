// crates/tag-cicd-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration keys and parsers.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use super::harness::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Optional TOML config file path.
    ConfigPath,
    /// Gateway base URL (scheme, host, and route prefix).
    BaseUrl,
    /// Tag provider targeted by scenarios.
    Provider,
    /// Directory holding fixture documents.
    FixtureRoot,
    /// Export root as seen by the gateway.
    GatewayExportRoot,
    /// Export root as seen by the harness host.
    HostExportRoot,
    /// Directory receiving comparison debug artifacts.
    DebugDir,
    /// Optional request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Accept self-signed gateway certificates (`true`/`false` or `1`/`0`).
    AcceptInvalidCerts,
    /// Optional JSON-lines log file path.
    LogPath,
}

impl HarnessEnv {
    /// Every key, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::ConfigPath,
        Self::BaseUrl,
        Self::Provider,
        Self::FixtureRoot,
        Self::GatewayExportRoot,
        Self::HostExportRoot,
        Self::DebugDir,
        Self::TimeoutSeconds,
        Self::AcceptInvalidCerts,
        Self::LogPath,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "TAG_HARNESS_CONFIG",
            Self::BaseUrl => "TAG_HARNESS_BASE_URL",
            Self::Provider => "TAG_HARNESS_PROVIDER",
            Self::FixtureRoot => "TAG_HARNESS_FIXTURE_ROOT",
            Self::GatewayExportRoot => "TAG_HARNESS_GATEWAY_EXPORT_ROOT",
            Self::HostExportRoot => "TAG_HARNESS_HOST_EXPORT_ROOT",
            Self::DebugDir => "TAG_HARNESS_DEBUG_DIR",
            Self::TimeoutSeconds => "TAG_HARNESS_TIMEOUT_SEC",
            Self::AcceptInvalidCerts => "TAG_HARNESS_ACCEPT_INVALID_CERTS",
            Self::LogPath => "TAG_HARNESS_LOG_PATH",
        }
    }

    /// Reads this key, rejecting invalid UTF-8 and empty values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when the value is not UTF-8 or is blank.
    pub fn read(self) -> Result<Option<String>, ConfigError> {
        read_env_nonempty(self.as_str())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
pub(super) fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Env(format!(
            "{name} must be a positive integer number of seconds"
        )));
    }
    let secs: u64 = trimmed.parse().map_err(|_| {
        ConfigError::Env(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable; unset yields `None`.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
pub fn parse_bool_env(name: &str, raw: Option<&str>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(Some(true));
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(Some(false));
    }
    Err(ConfigError::Env(format!("{name} must be 1, 0, true, or false")))
}
