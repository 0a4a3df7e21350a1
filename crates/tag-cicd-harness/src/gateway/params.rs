// crates/tag-cicd-harness/src/gateway/params.rs
// ============================================================================
// Module: Gateway Request Parameters
// Description: Typed query parameters for the gateway tag routes.
// Purpose: Keep wire codes for policies and modes in one place.
// Dependencies: serde_json
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

// ============================================================================
// SECTION: Collision Policy
// ============================================================================

/// How an import resolves a tag path that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPolicy {
    /// Leave the existing tag untouched (`a`).
    Abort,
    /// Replace the existing tag (`o`).
    Overwrite,
    /// Merge, overwriting conflicting properties (`m`).
    MergeOverwrite,
    /// Delete everything under the base path, then import (`d`).
    DeleteAndReplace,
}

impl CollisionPolicy {
    /// Returns the single-letter wire code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Abort => "a",
            Self::Overwrite => "o",
            Self::MergeOverwrite => "m",
            Self::DeleteAndReplace => "d",
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a" | "abort" => Ok(Self::Abort),
            "o" | "overwrite" => Ok(Self::Overwrite),
            "m" | "merge" | "mergeoverwrite" => Ok(Self::MergeOverwrite),
            "d" | "delete" | "deleteandreplace" => Ok(Self::DeleteAndReplace),
            other => Err(format!("unknown collision policy: {other}")),
        }
    }
}

// ============================================================================
// SECTION: Export Mode
// ============================================================================

/// Shape of a file export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportMode {
    /// One composite JSON document.
    SingleFile,
    /// One JSON file per tag, one directory per folder.
    IndividualFiles,
    /// Per-folder `tags.json` / `udts.json` files.
    StructuredByType,
}

impl ExportMode {
    /// Returns the `exportMode` wire code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SingleFile => "singleFile",
            Self::IndividualFiles => "individualFiles",
            Self::StructuredByType => "structuredByType",
        }
    }

    /// Returns the gateway's display name for the mode.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::SingleFile => "Single JSON File",
            Self::IndividualFiles => "Individual Files",
            Self::StructuredByType => "Structured Files",
        }
    }

    /// Looks a mode up by wire code, ignoring ASCII case.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        [Self::SingleFile, Self::IndividualFiles, Self::StructuredByType]
            .into_iter()
            .find(|mode| mode.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// SECTION: Import Payload
// ============================================================================

/// Body of an import request.
#[derive(Debug, Clone, Copy)]
pub enum ImportPayload<'a> {
    /// A parsed document, serialized compactly before sending.
    Document(&'a Value),
    /// Raw bytes sent verbatim (fixtures, deliberately malformed payloads).
    Bytes(&'a [u8]),
}

impl ImportPayload<'_> {
    /// Returns the request body bytes.
    ///
    /// # Errors
    ///
    /// Returns the serializer message if a document cannot be encoded.
    pub fn to_body(self) -> Result<Vec<u8>, String> {
        match self {
            ImportPayload::Document(document) => {
                serde_json::to_vec(document).map_err(|err| err.to_string())
            }
            ImportPayload::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

// ============================================================================
// SECTION: Export Requests
// ============================================================================

/// Parameters for an export written to the shared mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Tag provider to export.
    pub provider: String,
    /// Folder to export from; empty for the provider root.
    pub base_tag_path: String,
    /// Include nested folders.
    pub recursive: bool,
    /// Output shape.
    pub mode: ExportMode,
    /// Export only locally overridden properties.
    pub local_props_only: bool,
    /// Destination as the gateway sees it.
    pub file_path: String,
    /// Clear the destination directory first (directory modes only).
    pub delete_existing: bool,
    /// Skip the `_types_` folder.
    pub exclude_udt_definitions: bool,
}

impl ExportRequest {
    /// Recursive, local-props-only, single-file export of the whole provider.
    #[must_use]
    pub fn single_file(provider: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            base_tag_path: String::new(),
            recursive: true,
            mode: ExportMode::SingleFile,
            local_props_only: true,
            file_path: file_path.into(),
            delete_existing: false,
            exclude_udt_definitions: false,
        }
    }

    /// Recursive, local-props-only, one-file-per-object export of the whole
    /// provider. Stale files from earlier runs are cleared first.
    #[must_use]
    pub fn individual_files(provider: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            mode: ExportMode::IndividualFiles,
            delete_existing: true,
            ..Self::single_file(provider, file_path)
        }
    }

    /// Returns a copy scoped to `base_tag_path`.
    #[must_use]
    pub fn with_base_tag_path(mut self, base_tag_path: impl Into<String>) -> Self {
        self.base_tag_path = base_tag_path.into();
        self
    }

    /// Returns the query pairs, in wire order. Both `exportMode` and the older
    /// `individualFilesPerObject` flag are sent so either gateway generation
    /// picks the intended shape.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("provider", self.provider.clone()),
            ("baseTagPath", self.base_tag_path.clone()),
            ("recursive", bool_param(self.recursive)),
            (
                "individualFilesPerObject",
                bool_param(self.mode == ExportMode::IndividualFiles),
            ),
            ("localPropsOnly", bool_param(self.local_props_only)),
            ("filePath", self.file_path.clone()),
            ("exportMode", self.mode.code().to_string()),
            ("deleteExisting", bool_param(self.delete_existing)),
            ("excludeUdtDefinitions", bool_param(self.exclude_udt_definitions)),
        ]
    }
}

/// Parameters for an export returned in the response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineExport {
    /// Tag provider; the gateway default when unset.
    pub provider: Option<String>,
    /// Folder to export from; the provider root when unset.
    pub base_tag_path: Option<String>,
    /// Include nested folders.
    pub recursive: bool,
    /// Export only locally overridden properties.
    pub local_props_only: bool,
}

impl InlineExport {
    /// Export of the default provider with only `recursive` set.
    #[must_use]
    pub fn recursive(recursive: bool) -> Self {
        Self {
            recursive,
            ..Self::default()
        }
    }

    /// Returns the query pairs; unset options are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(provider) = &self.provider {
            pairs.push(("provider", provider.clone()));
        }
        if let Some(base_tag_path) = &self.base_tag_path {
            pairs.push(("baseTagPath", base_tag_path.clone()));
        }
        pairs.push(("recursive", bool_param(self.recursive)));
        if self.local_props_only {
            pairs.push(("localPropsOnly", bool_param(true)));
        }
        pairs
    }
}

/// Formats a boolean query parameter.
fn bool_param(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
