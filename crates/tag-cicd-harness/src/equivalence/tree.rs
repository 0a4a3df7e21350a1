// crates/tag-cicd-harness/src/equivalence/tree.rs
// ============================================================================
// Module: Artifact Tree Comparison
// Description: Compares two directory trees of named artifacts.
// Purpose: Check multi-file exports with a pluggable leaf comparison.
// Dependencies: walkdir
// ============================================================================

//! ## Overview
//! Both trees are enumerated fully before any leaf is compared. The entry
//! sets (files and directories, by relative path) must match exactly; the
//! first unmatched entry in sorted order fails the comparison. Matching file
//! pairs are then handed to the leaf comparison in sorted order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use super::ComparisonFailure;
use super::Side;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Entry kind within an artifact tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// Relative path to entry kind for one tree.
type TreeListing = BTreeMap<PathBuf, EntryKind>;

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Compares two trees and returns the number of leaf pairs compared.
///
/// `leaf` receives the relative path followed by the left and right full
/// paths of each matching file pair.
///
/// # Errors
///
/// Returns [`ComparisonFailure::MissingFile`] for an entry present on only one
/// side, [`ComparisonFailure::KindMismatch`] when a path is a file on one side
/// and a directory on the other, [`ComparisonFailure::Io`] when a tree cannot
/// be enumerated, and [`ComparisonFailure::Leaf`] wrapping the first leaf
/// failure.
pub fn compare_trees<F>(left: &Path, right: &Path, mut leaf: F) -> Result<usize, ComparisonFailure>
where
    F: FnMut(&Path, &Path, &Path) -> Result<(), ComparisonFailure>,
{
    let left_listing = list_tree(left, Side::Expected)?;
    let right_listing = list_tree(right, Side::Actual)?;

    let mut all_paths: Vec<&PathBuf> = left_listing.keys().chain(right_listing.keys()).collect();
    all_paths.sort();
    all_paths.dedup();
    for path in all_paths {
        match (left_listing.get(path), right_listing.get(path)) {
            (Some(left_kind), Some(right_kind)) if left_kind != right_kind => {
                return Err(ComparisonFailure::KindMismatch {
                    path: path.clone(),
                });
            }
            (Some(_), Some(_)) => {}
            (Some(_), None) => {
                return Err(ComparisonFailure::MissingFile {
                    path: path.clone(),
                    side: Side::Actual,
                });
            }
            (None, _) => {
                return Err(ComparisonFailure::MissingFile {
                    path: path.clone(),
                    side: Side::Expected,
                });
            }
        }
    }

    let mut compared = 0;
    for (relative, kind) in &left_listing {
        if *kind != EntryKind::File {
            continue;
        }
        leaf(relative, &left.join(relative), &right.join(relative)).map_err(|source| {
            ComparisonFailure::Leaf {
                path: relative.clone(),
                source: Box::new(source),
            }
        })?;
        compared += 1;
    }
    Ok(compared)
}

/// Enumerates every entry below `root` by relative path.
fn list_tree(root: &Path, side: Side) -> Result<TreeListing, ComparisonFailure> {
    if !root.exists() {
        return Err(ComparisonFailure::MissingFile {
            path: root.to_path_buf(),
            side,
        });
    }
    if !root.is_dir() {
        return Err(ComparisonFailure::Io {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }
    let mut listing = TreeListing::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| ComparisonFailure::Io {
            path: err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            message: err.to_string(),
        })?;
        let relative = entry.path().strip_prefix(root).map_err(|err| ComparisonFailure::Io {
            path: entry.path().to_path_buf(),
            message: err.to_string(),
        })?;
        let kind =
            if entry.file_type().is_dir() { EntryKind::Directory } else { EntryKind::File };
        listing.insert(relative.to_path_buf(), kind);
    }
    Ok(listing)
}
