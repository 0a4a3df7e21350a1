// crates/tag-cicd-harness/src/gateway/reports.rs
// ============================================================================
// Module: Gateway Response Reports
// Description: Parsed success responses from the gateway tag routes.
// Purpose: Surface per-tag quality codes returned by import and delete.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Import and delete responses map tag paths to arrays of quality-code
//! strings such as `"Good"` or `"Bad_NotFound"`. A code counts as successful
//! when it starts with `Good`. Shapes the harness does not recognize are kept
//! verbatim in `body` and otherwise ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Quality Codes
// ============================================================================

/// Tag path to quality codes reported for it.
pub type QualityMap = BTreeMap<String, Vec<String>>;

/// Returns true when a quality code denotes success.
#[must_use]
pub fn is_good_quality(code: &str) -> bool {
    code.starts_with("Good")
}

/// Collects every `path → [code]` entry of a JSON object.
fn quality_map(value: Option<&Value>) -> QualityMap {
    let Some(Value::Object(map)) = value else {
        return QualityMap::new();
    };
    map.iter()
        .filter_map(|(path, codes)| {
            let Value::Array(codes) = codes else {
                return None;
            };
            let codes = codes
                .iter()
                .map(|code| match code {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect();
            Some((path.clone(), codes))
        })
        .collect()
}

/// Returns the first non-`Good` code in a quality map.
fn first_rejection(map: &QualityMap) -> Option<(&str, &str)> {
    map.iter().find_map(|(path, codes)| {
        codes
            .iter()
            .find(|code| !is_good_quality(code))
            .map(|code| (path.as_str(), code.as_str()))
    })
}

/// Parses a response body; an empty body is `Value::Null`.
///
/// # Errors
///
/// Returns the parser message when a non-empty body is not JSON.
pub(super) fn parse_body(body: &[u8]) -> Result<Value, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Successful import response.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// HTTP status returned by the gateway.
    pub status: u16,
    /// Tags created or updated, with their quality codes.
    pub created: QualityMap,
    /// Tags deleted ahead of a delete-and-replace import.
    pub deleted: QualityMap,
    /// Full response body.
    pub body: Value,
}

impl ImportReport {
    /// Builds a report from a success response body.
    #[must_use]
    pub fn from_body(status: u16, body: Value) -> Self {
        Self {
            status,
            created: quality_map(body.get("created_tags")),
            deleted: quality_map(body.get("deleted_tags")),
            body,
        }
    }

    /// Returns the first tag path whose import was not `Good`.
    #[must_use]
    pub fn first_rejection(&self) -> Option<(&str, &str)> {
        first_rejection(&self.created).or_else(|| first_rejection(&self.deleted))
    }
}

/// Successful file export response.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// HTTP status returned by the gateway.
    pub status: u16,
    /// Response body (`status`, `filePath`, `exportMode` on current gateways).
    pub body: Value,
}

/// Successful delete response.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteReport {
    /// HTTP status returned by the gateway.
    pub status: u16,
    /// Deleted tag paths with their quality codes.
    pub results: QualityMap,
}

impl DeleteReport {
    /// Builds a report from a success response body.
    #[must_use]
    pub fn from_body(status: u16, body: &Value) -> Self {
        Self {
            status,
            results: quality_map(Some(body)),
        }
    }

    /// Returns the first tag path whose deletion was not `Good`.
    #[must_use]
    pub fn first_rejection(&self) -> Option<(&str, &str)> {
        first_rejection(&self.results)
    }
}

/// One entry of the export-modes listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportModeInfo {
    /// Wire code (`singleFile`, `individualFiles`, ...).
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Body of `GET /tags/export/modes`.
#[derive(Debug, Deserialize)]
pub(super) struct ExportModesBody {
    /// Supported modes.
    pub(super) modes: Vec<ExportModeInfo>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
