// crates/tag-cicd-harness/src/config/harness.rs
// ============================================================================
// Module: Harness Config Model
// Description: Typed harness configuration with TOML and env overlays.
// Purpose: Resolve gateway address, fixture root, and shared-mount mapping.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! [`HarnessConfig`] defaults describe the reference docker deployment: a
//! gateway behind `tag-cicd.localtest.me` with a self-signed certificate, and
//! a bind mount exposing the gateway's `data/tags` directory to the host as
//! `docker/temp/ignition-data/tags`. A TOML file named by
//! `TAG_HARNESS_CONFIG` replaces any subset of the defaults, and individual
//! environment variables win over both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::env::HarnessEnv;
use super::env::parse_bool_env;
use super::env::parse_timeout_seconds;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default gateway base URL, including the module's route prefix.
const DEFAULT_BASE_URL: &str = "https://tag-cicd.localtest.me/data/tag-cicd";
/// Default tag provider.
const DEFAULT_PROVIDER: &str = "default";
/// Default fixture directory, relative to the working directory.
const DEFAULT_FIXTURE_ROOT: &str = "fixtures";
/// Default export root inside the gateway container.
const DEFAULT_GATEWAY_EXPORT_ROOT: &str = "data/tags";
/// Default host path of the bind-mounted export root.
const DEFAULT_HOST_EXPORT_ROOT: &str = "docker/temp/ignition-data/tags";
/// Default directory for comparison debug artifacts.
const DEFAULT_DEBUG_DIR: &str = "target/tag-harness/debug";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Gateway base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Tag provider used by scenarios and cleared by reset.
    pub provider: String,
    /// Directory that relative fixture names resolve against.
    pub fixture_root: PathBuf,
    /// Export root as the gateway sees it (sent in `filePath`).
    pub gateway_export_root: String,
    /// The same export root as the harness host sees it.
    pub host_export_root: PathBuf,
    /// Directory receiving `expected.json` / `actual.json` on failure.
    pub debug_dir: PathBuf,
    /// Optional per-request timeout; `None` keeps the transport default.
    pub timeout_seconds: Option<u64>,
    /// Accept self-signed gateway certificates.
    pub accept_invalid_certs: bool,
    /// Optional JSON-lines log file; stderr when unset.
    pub log_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            provider: DEFAULT_PROVIDER.to_string(),
            fixture_root: PathBuf::from(DEFAULT_FIXTURE_ROOT),
            gateway_export_root: DEFAULT_GATEWAY_EXPORT_ROOT.to_string(),
            host_export_root: PathBuf::from(DEFAULT_HOST_EXPORT_ROOT),
            debug_dir: PathBuf::from(DEFAULT_DEBUG_DIR),
            timeout_seconds: None,
            accept_invalid_certs: true,
            log_path: None,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from the optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or any environment value is
    /// invalid, or when the merged configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match HarnessEnv::ConfigPath.read()? {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file without applying env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O, size, UTF-8, or TOML errors.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses TOML configuration text; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid config TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Overlays environment variables onto this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a set variable is blank, not UTF-8,
    /// or not parseable for its key.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = HarnessEnv::BaseUrl.read()? {
            self.base_url = value;
        }
        if let Some(value) = HarnessEnv::Provider.read()? {
            self.provider = value;
        }
        if let Some(value) = HarnessEnv::FixtureRoot.read()? {
            self.fixture_root = PathBuf::from(value);
        }
        if let Some(value) = HarnessEnv::GatewayExportRoot.read()? {
            self.gateway_export_root = value;
        }
        if let Some(value) = HarnessEnv::HostExportRoot.read()? {
            self.host_export_root = PathBuf::from(value);
        }
        if let Some(value) = HarnessEnv::DebugDir.read()? {
            self.debug_dir = PathBuf::from(value);
        }
        if let Some(value) = HarnessEnv::TimeoutSeconds.read()? {
            let timeout = parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value)?;
            self.timeout_seconds = Some(timeout.as_secs());
        }
        let accept = HarnessEnv::AcceptInvalidCerts.read()?;
        if let Some(value) =
            parse_bool_env(HarnessEnv::AcceptInvalidCerts.as_str(), accept.as_deref())?
        {
            self.accept_invalid_certs = value;
        }
        if let Some(value) = HarnessEnv::LogPath.read()? {
            self.log_path = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("base_url is not a url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("base_url must use http or https".to_string()));
        }
        if url.cannot_be_a_base() {
            return Err(ConfigError::Invalid("base_url cannot carry endpoint paths".to_string()));
        }
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("provider must not be empty".to_string()));
        }
        if self.gateway_export_root.trim().is_empty() {
            return Err(ConfigError::Invalid("gateway_export_root must not be empty".to_string()));
        }
        if self.timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid("timeout_seconds must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Returns the configured request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Returns the gateway-to-host export path mapping.
    #[must_use]
    pub fn path_mapping(&self) -> PathMapping {
        PathMapping::new(self.gateway_export_root.clone(), self.host_export_root.clone())
    }
}

// ============================================================================
// SECTION: Path Mapping
// ============================================================================

/// Maps export names between the gateway's view and the host's view of the
/// shared export mount.
///
/// # Invariants
/// - Both roots refer to the same underlying storage.
/// - Export names are relative and never climb out of the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Export root inside the gateway container.
    gateway_root: String,
    /// Export root on the harness host.
    host_root: PathBuf,
}

impl PathMapping {
    /// Creates a mapping between the two roots.
    #[must_use]
    pub fn new(gateway_root: impl Into<String>, host_root: impl Into<PathBuf>) -> Self {
        Self {
            gateway_root: gateway_root.into(),
            host_root: host_root.into(),
        }
    }

    /// Returns the host-side export root.
    #[must_use]
    pub fn host_root(&self) -> &Path {
        &self.host_root
    }

    /// Returns the path the gateway should write `name` to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `name` is not a plain relative path.
    pub fn gateway_path(&self, name: &str) -> Result<String, ConfigError> {
        validate_export_name(name)?;
        let root = self.gateway_root.trim_end_matches('/');
        Ok(format!("{root}/{}", name.trim_start_matches("./")))
    }

    /// Returns where the harness reads `name` after the gateway wrote it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `name` is not a plain relative path.
    pub fn host_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        validate_export_name(name)?;
        Ok(self.host_root.join(name))
    }
}

/// Rejects empty, absolute, or parent-climbing export names.
fn validate_export_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Invalid("export name must not be empty".to_string()));
    }
    let path = Path::new(name);
    let plain = path.components().all(|component| {
        matches!(component, Component::Normal(_) | Component::CurDir)
    });
    if !plain {
        return Err(ConfigError::Invalid(format!(
            "export name must be a relative path inside the export root: {name}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening a log file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid environment value.
    #[error("config env error: {0}")]
    Env(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}
