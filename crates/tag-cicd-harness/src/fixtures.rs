// crates/tag-cicd-harness/src/fixtures.rs
// ============================================================================
// Module: Fixture Loader
// Description: Reads reference tag-export documents from disk.
// Purpose: Supply fresh, independently parsed fixture copies per scenario.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Fixtures are re-read and re-parsed on every call. Nothing is cached, so a
//! scenario can never observe another scenario's in-memory document, and a
//! fixture edited between scenarios is picked up immediately. Reads are
//! bounded to keep a mis-pointed fixture path from exhausting memory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum fixture size in bytes.
pub const MAX_FIXTURE_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture loading failures. Fatal to the scenario and never retried.
#[derive(Debug, Error)]
pub enum FixtureReadError {
    /// The fixture file does not exist.
    #[error("fixture not found: {}", path.display())]
    Missing {
        /// Resolved fixture path.
        path: PathBuf,
    },
    /// The fixture exists but could not be read.
    #[error("fixture unreadable: {}: {message}", path.display())]
    Unreadable {
        /// Resolved fixture path.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },
    /// The fixture exceeds [`MAX_FIXTURE_BYTES`].
    #[error("fixture exceeds {limit} bytes: {}", path.display())]
    TooLarge {
        /// Resolved fixture path.
        path: PathBuf,
        /// Byte limit that was exceeded.
        limit: usize,
    },
    /// The fixture is not valid JSON.
    #[error("fixture is not valid json: {}: {message}", path.display())]
    InvalidJson {
        /// Resolved fixture path.
        path: PathBuf,
        /// Parser error text, including line and column.
        message: String,
    },
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Resolves fixture names against a root directory and loads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLoader {
    /// Directory that relative fixture names resolve against.
    root: PathBuf,
}

impl FixtureLoader {
    /// Creates a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the fixture root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a fixture name; absolute paths are returned unchanged.
    #[must_use]
    pub fn resolve(&self, name: &Path) -> PathBuf {
        if name.is_absolute() { name.to_path_buf() } else { self.root.join(name) }
    }

    /// Loads and parses a fixture document.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureReadError`] when the file is missing, unreadable,
    /// oversized, or not valid JSON.
    pub fn load(&self, name: &Path) -> Result<Value, FixtureReadError> {
        load_fixture(&self.resolve(name))
    }

    /// Loads a fixture's raw bytes for use as an import payload.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureReadError`] when the file is missing, unreadable, or
    /// oversized. JSON validity is not checked.
    pub fn load_bytes(&self, name: &Path) -> Result<Vec<u8>, FixtureReadError> {
        read_fixture_bytes(&self.resolve(name))
    }
}

/// Loads and parses the JSON document at `path`.
///
/// # Errors
///
/// Returns [`FixtureReadError`] when the file is missing, unreadable,
/// oversized, or not valid JSON.
pub fn load_fixture(path: &Path) -> Result<Value, FixtureReadError> {
    let bytes = read_fixture_bytes(path)?;
    serde_json::from_slice(&bytes).map_err(|err| FixtureReadError::InvalidJson {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Reads the raw bytes at `path` while enforcing [`MAX_FIXTURE_BYTES`].
///
/// # Errors
///
/// Returns [`FixtureReadError`] when the file is missing, unreadable, or
/// oversized.
pub fn read_fixture_bytes(path: &Path) -> Result<Vec<u8>, FixtureReadError> {
    let file = File::open(path).map_err(|err| open_error(path, &err))?;
    let mut buf = Vec::new();
    let limit = u64::try_from(MAX_FIXTURE_BYTES.saturating_add(1)).unwrap_or(u64::MAX);
    file.take(limit).read_to_end(&mut buf).map_err(|err| FixtureReadError::Unreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    if buf.len() > MAX_FIXTURE_BYTES {
        return Err(FixtureReadError::TooLarge {
            path: path.to_path_buf(),
            limit: MAX_FIXTURE_BYTES,
        });
    }
    Ok(buf)
}

/// Maps an open failure onto the missing/unreadable distinction.
fn open_error(path: &Path, err: &io::Error) -> FixtureReadError {
    if err.kind() == io::ErrorKind::NotFound {
        FixtureReadError::Missing {
            path: path.to_path_buf(),
        }
    } else {
        FixtureReadError::Unreadable {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
