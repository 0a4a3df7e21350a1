// crates/tag-cicd-harness/src/equivalence/mod.rs
// ============================================================================
// Module: Equivalence Checker
// Description: Structural, byte-exact, and tree comparison of exports.
// Purpose: Decide whether exported artifacts are the tags that went in.
// Dependencies: serde_json, thiserror, walkdir
// ============================================================================

//! ## Overview
//! | Mode           | Inputs                     | Equality                      |
//! |----------------|----------------------------|-------------------------------|
//! | structural     | two documents              | canonical form, arrays ordered |
//! | byte-exact     | two files                  | identical bytes               |
//! | tree           | two directories            | same entries, leaf mode each  |
//! | representation | document and directory     | projected hierarchies         |
//!
//! Structural comparison treats a provider root (`tagType` `Provider`) as
//! its tags alone: the root's `name` and `tagType` are dropped on both sides,
//! so a recursive export compares directly with the imported document.
//!
//! Structural, tree, and representation failures persist both sides to the
//! debug directory before the failure is returned. Byte-exact failures do
//! not. Every verdict is logged as a `comparison` event.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod canonical;
mod debug;
pub mod hierarchy;
pub mod tree;


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use walkdir::WalkDir;

pub use canonical::canonicalize;
pub use canonical::first_divergence;
pub use canonical::structurally_equal;
pub use debug::ACTUAL_FILE;
pub use debug::EXPECTED_FILE;
pub use debug::FAILURE_FILE;
pub use hierarchy::flatten_tree;
pub use hierarchy::is_empty_tag_document;
pub use hierarchy::project;
pub use hierarchy::remaining_tags;
pub use hierarchy::strip_provider_root;
pub use tree::compare_trees;

use crate::fixtures::FixtureReadError;
use crate::fixtures::load_fixture;
use crate::logging::EventOutcome;
use crate::logging::HarnessEvent;
use crate::logging::HarnessLogSink;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Which side of a comparison an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Reference side (fixture or earlier export).
    Expected,
    /// Side under test.
    Actual,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => f.write_str("expected"),
            Self::Actual => f.write_str("actual"),
        }
    }
}

/// Leaf comparison applied to matching files in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafMode {
    /// Parse both files and compare structurally.
    Structural,
    /// Compare raw bytes.
    ByteExact,
}

impl LeafMode {
    /// Returns the mode label used in events and debug artifacts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "tree_structural",
            Self::ByteExact => "tree_byte_exact",
        }
    }

    /// Compares one file pair.
    fn compare(self, left: &Path, right: &Path) -> Result<(), ComparisonFailure> {
        match self {
            Self::Structural => compare_json_files(left, right),
            Self::ByteExact => compare_bytes(left, right),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Comparison verdicts other than pass. Never retried.
#[derive(Debug, Error)]
pub enum ComparisonFailure {
    /// Documents differ structurally.
    #[error("documents diverge at json pointer '{pointer}'")]
    Structural {
        /// JSON pointer of the first divergence.
        pointer: String,
    },
    /// Files differ byte-wise.
    #[error("{} and {} differ at byte {offset}", left.display(), right.display())]
    Bytes {
        /// Expected-side file.
        left: PathBuf,
        /// Actual-side file.
        right: PathBuf,
        /// Offset of the first differing byte, or the shorter length.
        offset: usize,
    },
    /// An artifact exists on only one side.
    #[error("{} missing on {side} side", path.display())]
    MissingFile {
        /// Missing path (relative inside trees).
        path: PathBuf,
        /// Side the path is missing from.
        side: Side,
    },
    /// A path is a file on one side and a directory on the other.
    #[error("{} is a file on one side and a directory on the other", path.display())]
    KindMismatch {
        /// Relative path.
        path: PathBuf,
    },
    /// A matching pair inside a tree differs.
    #[error("tree entry {} differs: {source}", path.display())]
    Leaf {
        /// Relative path of the pair.
        path: PathBuf,
        /// Leaf failure.
        source: Box<ComparisonFailure>,
    },
    /// A multi-artifact comparison was given too few artifacts.
    #[error("comparison needs at least {required} artifacts, got {found}")]
    TooFewArtifacts {
        /// Minimum artifact count.
        required: usize,
        /// Artifacts supplied.
        found: usize,
    },
    /// An artifact could not be read or enumerated.
    #[error("artifact io error at {}: {message}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// I/O error text.
        message: String,
    },
    /// An artifact is not valid JSON.
    #[error("artifact is not valid json: {}: {message}", path.display())]
    InvalidJson {
        /// Artifact path.
        path: PathBuf,
        /// Parser error text.
        message: String,
    },
}

/// Maps an artifact read failure onto a comparison failure.
pub(crate) fn artifact_error(err: FixtureReadError, side: Side) -> ComparisonFailure {
    match err {
        FixtureReadError::Missing {
            path,
        } => ComparisonFailure::MissingFile {
            path,
            side,
        },
        FixtureReadError::Unreadable {
            path,
            message,
        } => ComparisonFailure::Io {
            path,
            message,
        },
        FixtureReadError::TooLarge {
            path,
            limit,
        } => ComparisonFailure::Io {
            path,
            message: format!("exceeds {limit} bytes"),
        },
        FixtureReadError::InvalidJson {
            path,
            message,
        } => ComparisonFailure::InvalidJson {
            path,
            message,
        },
    }
}

// ============================================================================
// SECTION: Leaf Comparisons
// ============================================================================

/// Compares two files byte for byte with no normalization. Both files are
/// streamed, so no size limit applies.
///
/// # Errors
///
/// Returns [`ComparisonFailure::Bytes`] on the first differing byte, or a read
/// failure for either side.
pub fn compare_bytes(left: &Path, right: &Path) -> Result<(), ComparisonFailure> {
    let mut left_reader = open_artifact(left, Side::Expected)?;
    let mut right_reader = open_artifact(right, Side::Actual)?;
    let mut offset = 0usize;
    loop {
        let left_chunk = left_reader.fill_buf().map_err(|err| read_failure(left, &err))?;
        let right_chunk = right_reader.fill_buf().map_err(|err| read_failure(right, &err))?;
        if left_chunk.is_empty() && right_chunk.is_empty() {
            return Ok(());
        }
        let shared = left_chunk.len().min(right_chunk.len());
        let mismatch = left_chunk
            .iter()
            .zip(right_chunk)
            .position(|(left_byte, right_byte)| left_byte != right_byte);
        if let Some(position) = mismatch {
            return Err(bytes_failure(left, right, offset.saturating_add(position)));
        }
        if shared == 0 {
            return Err(bytes_failure(left, right, offset));
        }
        left_reader.consume(shared);
        right_reader.consume(shared);
        offset = offset.saturating_add(shared);
    }
}

/// Opens one side of a byte comparison.
fn open_artifact(path: &Path, side: Side) -> Result<BufReader<File>, ComparisonFailure> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ComparisonFailure::MissingFile {
            path: path.to_path_buf(),
            side,
        }),
        Err(err) => Err(read_failure(path, &err)),
    }
}

/// Maps a read error onto [`ComparisonFailure::Io`].
fn read_failure(path: &Path, err: &io::Error) -> ComparisonFailure {
    ComparisonFailure::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Builds the byte mismatch failure.
fn bytes_failure(left: &Path, right: &Path, offset: usize) -> ComparisonFailure {
    ComparisonFailure::Bytes {
        left: left.to_path_buf(),
        right: right.to_path_buf(),
        offset,
    }
}

/// Parses two files and compares them structurally.
///
/// # Errors
///
/// Returns [`ComparisonFailure::Structural`] naming the first divergence, or a
/// read or parse failure for either side.
pub fn compare_json_files(left: &Path, right: &Path) -> Result<(), ComparisonFailure> {
    let expected = load_fixture(left).map_err(|err| artifact_error(err, Side::Expected))?;
    let actual = load_fixture(right).map_err(|err| artifact_error(err, Side::Actual))?;
    compare_values(&expected, &actual)
}

/// Compares two parsed documents structurally, ignoring a provider root's
/// `name` and `tagType`.
fn compare_values(expected: &Value, actual: &Value) -> Result<(), ComparisonFailure> {
    match first_divergence(&strip_provider_root(expected), &strip_provider_root(actual)) {
        None => Ok(()),
        Some(pointer) => Err(ComparisonFailure::Structural {
            pointer,
        }),
    }
}

// ============================================================================
// SECTION: Checker
// ============================================================================

/// Comparison entry point carrying the debug directory and event sink.
#[derive(Clone)]
pub struct EquivalenceChecker {
    /// Directory receiving debug artifacts on failure.
    debug_dir: PathBuf,
    /// Event sink for verdicts and swallowed write failures.
    sink: Arc<dyn HarnessLogSink>,
    /// Scenario label attached to events and artifacts.
    scenario: Option<String>,
}

impl EquivalenceChecker {
    /// Creates a checker writing debug artifacts to `debug_dir`.
    #[must_use]
    pub fn new(debug_dir: impl Into<PathBuf>, sink: Arc<dyn HarnessLogSink>) -> Self {
        Self {
            debug_dir: debug_dir.into(),
            sink,
            scenario: None,
        }
    }

    /// Returns a copy that labels events with `scenario`.
    #[must_use]
    pub fn with_scenario(&self, scenario: impl Into<String>) -> Self {
        Self {
            scenario: Some(scenario.into()),
            ..self.clone()
        }
    }

    /// Returns the debug directory.
    #[must_use]
    pub fn debug_dir(&self) -> &Path {
        &self.debug_dir
    }

    /// Compares two documents structurally.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonFailure::Structural`] after persisting both sides.
    pub fn check_documents(&self, expected: &Value, actual: &Value) -> Result<(), ComparisonFailure> {
        let verdict = compare_values(expected, actual);
        self.conclude("structural", None, verdict, || (expected.clone(), actual.clone()))
    }

    /// Compares a document against the JSON file at `actual`.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonFailure`] when the file is missing, unreadable, not
    /// JSON, or structurally different. Both sides are persisted.
    pub fn check_document_file(&self, expected: &Value, actual: &Path) -> Result<(), ComparisonFailure> {
        let (document, verdict) = match load_fixture(actual) {
            Ok(document) => {
                let verdict = compare_values(expected, &document);
                (document, verdict)
            }
            Err(err) => (Value::Null, Err(artifact_error(err, Side::Actual))),
        };
        self.conclude("structural", Some(actual), verdict, || (expected.clone(), document))
    }

    /// Compares two files byte for byte. Nothing is persisted on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonFailure::Bytes`] or a read failure.
    pub fn check_files_identical(&self, left: &Path, right: &Path) -> Result<(), ComparisonFailure> {
        let verdict = compare_bytes(left, right);
        self.record("byte_exact", Some(right), verdict.as_ref().err());
        verdict
    }

    /// Compares two directory trees with `mode` applied to each file pair and
    /// returns the number of pairs compared.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonFailure`] for unmatched entries or the first leaf
    /// failure, after persisting snapshots of both trees.
    pub fn check_trees(
        &self,
        expected: &Path,
        actual: &Path,
        mode: LeafMode,
    ) -> Result<usize, ComparisonFailure> {
        let verdict =
            compare_trees(expected, actual, |_, left, right| mode.compare(left, right));
        let compared = verdict.as_ref().map_or(0, |count| *count);
        self.conclude(mode.as_str(), Some(actual), verdict.map(|_| ()), || {
            (snapshot_tree(expected), snapshot_tree(actual))
        })?;
        Ok(compared)
    }

    /// Compares a single-document export against an individual-files export
    /// of the same state, after flattening the tree and projecting both.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonFailure`] when the tree cannot be read or the
    /// projections differ, after persisting both projections.
    pub fn check_representations(
        &self,
        document: &Value,
        tree_root: &Path,
    ) -> Result<(), ComparisonFailure> {
        let expected = project(document);
        let (actual, verdict) = match flatten_tree(tree_root) {
            Ok(flattened) => {
                let actual = project(&flattened);
                let verdict = compare_values(&expected, &actual);
                (actual, verdict)
            }
            Err(err) => (Value::Null, Err(err)),
        };
        self.conclude("representation", Some(tree_root), verdict, || (expected.clone(), actual))
    }

    /// Logs a verdict and persists both sides when it is a failure.
    fn conclude<F>(
        &self,
        mode: &str,
        path: Option<&Path>,
        verdict: Result<(), ComparisonFailure>,
        sides: F,
    ) -> Result<(), ComparisonFailure>
    where
        F: FnOnce() -> (Value, Value),
    {
        self.record(mode, path, verdict.as_ref().err());
        if let Err(failure) = &verdict {
            let (expected, actual) = sides();
            let rendered = failure.to_string();
            debug::persist(&self.debug_dir, self.sink.as_ref(), &debug::DebugRecord {
                mode,
                scenario: self.scenario.as_deref(),
                expected: &expected,
                actual: &actual,
                failure: &rendered,
            });
        }
        verdict
    }

    /// Records a `comparison` event.
    fn record(&self, mode: &str, path: Option<&Path>, failure: Option<&ComparisonFailure>) {
        let outcome = if failure.is_some() { EventOutcome::Error } else { EventOutcome::Ok };
        let mut event = HarnessEvent::new("comparison", outcome).operation(mode);
        if let Some(scenario) = &self.scenario {
            event = event.scenario(scenario.as_str());
        }
        if let Some(path) = path {
            event = event.path(path.display().to_string());
        }
        if let Some(failure) = failure {
            event = event.detail(failure.to_string());
        }
        self.sink.record(&event);
    }
}

/// Best-effort snapshot of a tree: relative path to parsed content, or null
/// for directories and unparseable files.
fn snapshot_tree(root: &Path) -> Value {
    let mut snapshot = Map::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter().flatten() {
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let content = if entry.file_type().is_file() {
            load_fixture(entry.path()).unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        snapshot.insert(relative.to_string_lossy().replace('\\', "/"), content);
    }
    Value::Object(snapshot)
}
