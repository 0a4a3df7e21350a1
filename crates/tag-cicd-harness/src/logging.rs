// crates/tag-cicd-harness/src/logging.rs
// ============================================================================
// Module: Harness Event Logging
// Description: Structured JSON-lines events for harness operations.
// Purpose: Record gateway calls, resets, and verdicts without hard deps.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every gateway request, reset, scenario phase change, and comparison verdict
//! is emitted as one JSON object per line. Sinks are pluggable so CI can keep
//! a log file next to the debug artifacts while local runs print to stderr.
//! Write failures inside a sink are dropped; logging never fails a scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::ConfigError;
use crate::config::HarnessConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label attached to every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    /// The operation succeeded.
    Ok,
    /// The operation failed.
    Error,
}

/// Harness event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessEvent {
    /// Event identifier (`gateway_request`, `reset`, `comparison`, ...).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Scenario label when the event belongs to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    /// Operation label (gateway operation, comparison mode, phase name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Operation outcome.
    pub outcome: EventOutcome,
    /// HTTP status when a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Filesystem path or tag path involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Free-form detail (error message, divergent path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HarnessEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event: &'static str, outcome: EventOutcome) -> Self {
        Self {
            event,
            timestamp_ms: now_millis(),
            scenario: None,
            operation: None,
            outcome,
            status: None,
            path: None,
            detail: None,
        }
    }

    /// Attaches a scenario label.
    #[must_use]
    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    /// Attaches an operation label.
    #[must_use]
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attaches an HTTP status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Returns milliseconds since the Unix epoch, or zero if the clock is skewed.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for harness events.
pub trait HarnessLogSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &HarnessEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrLogSink;

impl HarnessLogSink for StderrLogSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileLogSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl HarnessLogSink for FileLogSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct NoopLogSink;

impl HarnessLogSink for NoopLogSink {
    fn record(&self, _event: &HarnessEvent) {}
}

/// Builds the sink selected by configuration: a file when `log_path` is set,
/// stderr otherwise.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the log file cannot be opened.
pub fn sink_from_config(config: &HarnessConfig) -> Result<Arc<dyn HarnessLogSink>, ConfigError> {
    match &config.log_path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .map_err(|err| ConfigError::Io(format!("{}: {err}", parent.display())))?;
            }
            let sink = FileLogSink::new(path)
                .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrLogSink)),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
