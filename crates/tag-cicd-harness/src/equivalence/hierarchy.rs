// crates/tag-cicd-harness/src/equivalence/hierarchy.rs
// ============================================================================
// Module: Tag Hierarchy
// Description: Flattening and projection of tag hierarchies.
// Purpose: Relate single-file and individual-file exports of one tag store.
// Dependencies: serde_json, walkdir
// ============================================================================

//! ## Overview
//! An individual-files export writes each folder as a directory and every
//! other tag as `<name>.json`. [`flatten_tree`] reads such a tree back into a
//! single `{"tags": [...]}` document the way the gateway's directory import
//! does: files become tag objects and subdirectories become `Folder` objects.
//!
//! A directory tree carries no sibling order and no folder properties, and an
//! empty `_types_` folder is never written. [`project`] reduces a document to
//! exactly what survives that trip so the two shapes can be compared
//! structurally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::path::Path;

use serde_json::Map;
use serde_json::Value;
use walkdir::WalkDir;

use super::ComparisonFailure;
use super::Side;
use super::artifact_error;
use super::canonical::canonicalize;
use crate::fixtures::load_fixture;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Folder holding UDT definitions.
pub const TYPES_FOLDER: &str = "_types_";

/// Tag type written for folders read back from directories.
const FOLDER_TAG_TYPE: &str = "Folder";

/// Tag type of a provider root.
const PROVIDER_TAG_TYPE: &str = "Provider";

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Reads an individual-files export tree into one logical document.
///
/// # Errors
///
/// Returns [`ComparisonFailure`] when the tree cannot be enumerated or a file
/// is unreadable or not JSON.
pub fn flatten_tree(root: &Path) -> Result<Value, ComparisonFailure> {
    if !root.is_dir() {
        return Err(ComparisonFailure::MissingFile {
            path: root.to_path_buf(),
            side: Side::Actual,
        });
    }
    let mut document = Map::new();
    document.insert("tags".to_string(), Value::Array(read_folder(root)?));
    Ok(Value::Object(document))
}

/// Reads one directory level, recursing into subdirectories.
fn read_folder(dir: &Path) -> Result<Vec<Value>, ComparisonFailure> {
    let mut tags = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| ComparisonFailure::Io {
            path: dir.to_path_buf(),
            message: err.to_string(),
        })?;
        if entry.file_type().is_dir() {
            let mut folder = Map::new();
            folder.insert(
                "name".to_string(),
                Value::String(entry.file_name().to_string_lossy().into_owned()),
            );
            folder.insert("tagType".to_string(), Value::String(FOLDER_TAG_TYPE.to_string()));
            folder.insert("tags".to_string(), Value::Array(read_folder(entry.path())?));
            tags.push(Value::Object(folder));
        } else {
            let tag = load_fixture(entry.path()).map_err(|err| artifact_error(err, Side::Actual))?;
            tags.push(tag);
        }
    }
    Ok(tags)
}

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Projects a tag document onto what a directory tree can represent.
///
/// Tag lists are sorted by name, folders keep only `name`, `tagType` and
/// `tags`, and empty `_types_` folders are dropped. Non-folder tags are
/// kept whole in canonical form.
#[must_use]
pub fn project(document: &Value) -> Value {
    match document {
        Value::Object(map) => {
            let tags = map.get("tags").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
            let mut root = Map::new();
            root.insert("tags".to_string(), Value::Array(project_list(tags)));
            Value::Object(root)
        }
        Value::Array(tags) => Value::Array(project_list(tags)),
        other => canonicalize(other),
    }
}

/// Projects and sorts one list of sibling tags.
fn project_list(tags: &[Value]) -> Vec<Value> {
    let mut projected: Vec<Value> = tags.iter().filter_map(project_tag).collect();
    projected.sort_by(|left, right| tag_name(left).cmp(tag_name(right)));
    projected
}

/// Projects a single tag; `None` drops it.
fn project_tag(tag: &Value) -> Option<Value> {
    if !is_folder(tag) {
        return Some(canonicalize(tag));
    }
    let children = child_tags(tag);
    if is_empty_types_folder(tag) {
        return None;
    }
    let mut folder = Map::new();
    folder.insert("name".to_string(), Value::String(tag_name(tag).to_string()));
    folder.insert("tagType".to_string(), Value::String(FOLDER_TAG_TYPE.to_string()));
    folder.insert("tags".to_string(), Value::Array(project_list(children)));
    Some(Value::Object(folder))
}

// ============================================================================
// SECTION: Provider Root
// ============================================================================

/// Drops the `name` and `tagType` of a provider root so a recursive export
/// lines up with the `{"tags": [...]}` document that was imported. Any other
/// document is returned as is.
#[must_use]
pub fn strip_provider_root(document: &Value) -> Cow<'_, Value> {
    let Value::Object(map) = document else {
        return Cow::Borrowed(document);
    };
    if map.get("tagType").and_then(Value::as_str) != Some(PROVIDER_TAG_TYPE) {
        return Cow::Borrowed(document);
    }
    let stripped: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "name" | "tagType"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Cow::Owned(Value::Object(stripped))
}

// ============================================================================
// SECTION: Emptiness
// ============================================================================

/// Returns the names of top-level tags left in an exported document,
/// ignoring an empty `_types_` folder.
#[must_use]
pub fn remaining_tags(document: &Value) -> Vec<String> {
    let tags = match document {
        Value::Object(map) => map.get("tags").and_then(Value::as_array).map_or(&[][..], Vec::as_slice),
        Value::Array(tags) => tags.as_slice(),
        _ => &[],
    };
    tags.iter()
        .filter(|tag| !is_empty_types_folder(tag))
        .map(|tag| tag_name(tag).to_string())
        .collect()
}

/// Returns true when a document holds no tags beyond an empty `_types_`.
#[must_use]
pub fn is_empty_tag_document(document: &Value) -> bool {
    remaining_tags(document).is_empty()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the tag's `name`, or the empty string.
fn tag_name(tag: &Value) -> &str {
    tag.get("name").and_then(Value::as_str).unwrap_or_default()
}

/// Returns true for folder and provider tags.
fn is_folder(tag: &Value) -> bool {
    matches!(
        tag.get("tagType").and_then(Value::as_str),
        Some(FOLDER_TAG_TYPE | PROVIDER_TAG_TYPE)
    )
}

/// Returns a tag's children, or an empty slice.
fn child_tags(tag: &Value) -> &[Value] {
    tag.get("tags").and_then(Value::as_array).map_or(&[][..], Vec::as_slice)
}

/// Returns true for a `_types_` folder with no children.
fn is_empty_types_folder(tag: &Value) -> bool {
    is_folder(tag) && tag_name(tag) == TYPES_FOLDER && child_tags(tag).is_empty()
}
