// crates/tag-cicd-harness/src/gateway/client.rs
// ============================================================================
// Module: Gateway HTTP Client
// Description: Blocking client for the gateway tag routes.
// Purpose: Map gateway responses onto typed reports and failures.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! | Operation     | Method | Path                 |
//! |---------------|--------|----------------------|
//! | import        | POST   | `/tags/import`       |
//! | export        | POST   | `/tags/export`       |
//! | export inline | GET    | `/tags/export`       |
//! | delete        | DELETE | `/tags/delete`       |
//! | export modes  | GET    | `/tags/export/modes` |
//!
//! Any non-2xx status becomes a failure carrying the status and the response
//! body. When no timeout is configured the reqwest blocking default applies;
//! a gateway that accepts the connection and never answers stalls the
//! scenario until then.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::params::CollisionPolicy;
use super::params::ExportMode;
use super::params::ExportRequest;
use super::params::ImportPayload;
use super::params::InlineExport;
use super::reports::DeleteReport;
use super::reports::ExportModeInfo;
use super::reports::ExportModesBody;
use super::reports::ExportReport;
use super::reports::ImportReport;
use super::reports::parse_body;
use crate::config::HarnessConfig;
use crate::logging::EventOutcome;
use crate::logging::HarnessEvent;
use crate::logging::HarnessLogSink;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Gateway operation classification for errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    /// `POST /tags/import`.
    Import,
    /// `POST /tags/export`.
    Export,
    /// `GET /tags/export`.
    ExportInline,
    /// `DELETE /tags/delete`.
    Delete,
    /// `GET /tags/export/modes`.
    ExportModes,
}

impl GatewayOperation {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
            Self::ExportInline => "export_inline",
            Self::Delete => "delete",
            Self::ExportModes => "export_modes",
        }
    }

    /// Builds the status failure for this operation.
    fn failure(self, status: u16, body: &[u8]) -> GatewayError {
        let body = String::from_utf8_lossy(body).into_owned();
        match self {
            Self::Import => GatewayError::ImportFailure {
                status,
                body,
            },
            Self::Export | Self::ExportInline | Self::ExportModes => GatewayError::ExportFailure {
                operation: self,
                status,
                body,
            },
            Self::Delete => GatewayError::DeleteFailure {
                status,
                body,
            },
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway call failures. None are retried.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Import returned a non-success status.
    #[error("import failed with status {status}: {body}")]
    ImportFailure {
        /// HTTP status.
        status: u16,
        /// Response body for diagnosis.
        body: String,
    },
    /// Import returned success but rejected a tag.
    #[error("import rejected {path} with quality {quality}")]
    ImportRejected {
        /// Tag path reported by the gateway.
        path: String,
        /// First non-`Good` quality code.
        quality: String,
    },
    /// An export route returned a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    ExportFailure {
        /// Which export route failed.
        operation: GatewayOperation,
        /// HTTP status.
        status: u16,
        /// Response body for diagnosis.
        body: String,
    },
    /// Delete returned a non-success status.
    #[error("delete failed with status {status}: {body}")]
    DeleteFailure {
        /// HTTP status.
        status: u16,
        /// Response body for diagnosis.
        body: String,
    },
    /// No response was received.
    #[error("{operation} transport error: {message}")]
    Transport {
        /// Operation in flight.
        operation: GatewayOperation,
        /// Transport error text.
        message: String,
    },
    /// A success response could not be interpreted.
    #[error("{operation} returned an invalid response: {message}")]
    InvalidResponse {
        /// Operation whose response was invalid.
        operation: GatewayOperation,
        /// Parser or shape error text.
        message: String,
    },
    /// The request could not be built.
    #[error("invalid gateway request: {0}")]
    InvalidRequest(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Raw gateway response.
struct GatewayResponse {
    /// HTTP status.
    status: u16,
    /// Response body bytes.
    body: Vec<u8>,
}

/// Blocking client for the gateway tag routes.
pub struct GatewayClient {
    /// Route prefix every endpoint path is appended to.
    base_url: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Event sink for request logging.
    sink: Arc<dyn HarnessLogSink>,
}

impl GatewayClient {
    /// Creates a client from harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when the base URL is unusable
    /// or the HTTP client cannot be built.
    pub fn new(config: &HarnessConfig, sink: Arc<dyn HarnessLogSink>) -> Result<Self, GatewayError> {
        Self::with_options(&config.base_url, config.timeout(), config.accept_invalid_certs, sink)
    }

    /// Creates a client for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] when the base URL is unusable
    /// or the HTTP client cannot be built.
    pub fn with_options(
        base_url: &str,
        timeout: Option<Duration>,
        accept_invalid_certs: bool,
        sink: Arc<dyn HarnessLogSink>,
    ) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| GatewayError::InvalidRequest(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidRequest("base url cannot carry paths".to_string()));
        }
        let mut builder = Client::builder().danger_accept_invalid_certs(accept_invalid_certs);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| GatewayError::InvalidRequest(format!("http client build failed: {err}")))?;
        Ok(Self {
            base_url,
            client,
            sink,
        })
    }

    /// Returns the route prefix.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Imports tags under `base_tag_path` of `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ImportFailure`] on a non-success status and
    /// [`GatewayError::ImportRejected`] when the gateway reports a non-`Good`
    /// quality for any tag.
    pub fn import(
        &self,
        payload: ImportPayload<'_>,
        collision_policy: CollisionPolicy,
        provider: &str,
        base_tag_path: &str,
    ) -> Result<ImportReport, GatewayError> {
        let body = payload.to_body().map_err(GatewayError::InvalidRequest)?;
        let query = [
            ("provider", provider.to_string()),
            ("baseTagPath", base_tag_path.to_string()),
            ("collisionPolicy", collision_policy.code().to_string()),
            ("importType", "json".to_string()),
            ("exportMode", ExportMode::SingleFile.code().to_string()),
        ];
        let response =
            self.send(GatewayOperation::Import, Method::POST, "tags/import", &query, Some(body))?;
        let parsed = parse_body(&response.body).map_err(|message| {
            GatewayError::InvalidResponse {
                operation: GatewayOperation::Import,
                message,
            }
        })?;
        let report = ImportReport::from_body(response.status, parsed);
        if let Some((path, quality)) = report.first_rejection() {
            return Err(GatewayError::ImportRejected {
                path: path.to_string(),
                quality: quality.to_string(),
            });
        }
        Ok(report)
    }

    /// Exports tags to a file or directory on the shared mount.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ExportFailure`] on a non-success status and
    /// [`GatewayError::InvalidResponse`] when a non-empty body is not JSON.
    pub fn export(&self, request: &ExportRequest) -> Result<ExportReport, GatewayError> {
        let query = request.query_pairs();
        let response =
            self.send(GatewayOperation::Export, Method::POST, "tags/export", &query, None)?;
        let body = parse_body(&response.body).map_err(|message| {
            GatewayError::InvalidResponse {
                operation: GatewayOperation::Export,
                message,
            }
        })?;
        Ok(ExportReport {
            status: response.status,
            body,
        })
    }

    /// Exports the default provider and returns the document inline.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ExportFailure`] on a non-success status and
    /// [`GatewayError::InvalidResponse`] when the body is not JSON.
    pub fn export_inline(&self, recursive: bool) -> Result<Value, GatewayError> {
        self.export_inline_with(&InlineExport::recursive(recursive))
    }

    /// Exports with explicit scope and returns the document inline.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ExportFailure`] on a non-success status and
    /// [`GatewayError::InvalidResponse`] when the body is not JSON.
    pub fn export_inline_with(&self, request: &InlineExport) -> Result<Value, GatewayError> {
        let query = request.query_pairs();
        let response =
            self.send(GatewayOperation::ExportInline, Method::GET, "tags/export", &query, None)?;
        serde_json::from_slice(&response.body).map_err(|err| GatewayError::InvalidResponse {
            operation: GatewayOperation::ExportInline,
            message: err.to_string(),
        })
    }

    /// Deletes tags at `tag_path` of `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DeleteFailure`] on a non-success status and
    /// [`GatewayError::InvalidResponse`] when the body is not JSON.
    pub fn delete_tags(
        &self,
        provider: &str,
        tag_path: &str,
        recursive: bool,
    ) -> Result<DeleteReport, GatewayError> {
        let query = [
            ("provider", provider.to_string()),
            ("tagPath", tag_path.to_string()),
            ("recursive", recursive.to_string()),
        ];
        let response =
            self.send(GatewayOperation::Delete, Method::DELETE, "tags/delete", &query, None)?;
        let body = parse_body(&response.body).map_err(|message| {
            GatewayError::InvalidResponse {
                operation: GatewayOperation::Delete,
                message,
            }
        })?;
        Ok(DeleteReport::from_body(response.status, &body))
    }

    /// Lists the export modes the gateway supports.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ExportFailure`] on a non-success status and
    /// [`GatewayError::InvalidResponse`] when the listing is malformed.
    pub fn export_modes(&self) -> Result<Vec<ExportModeInfo>, GatewayError> {
        let response =
            self.send(GatewayOperation::ExportModes, Method::GET, "tags/export/modes", &[], None)?;
        let parsed: ExportModesBody =
            serde_json::from_slice(&response.body).map_err(|err| GatewayError::InvalidResponse {
                operation: GatewayOperation::ExportModes,
                message: err.to_string(),
            })?;
        Ok(parsed.modes)
    }

    /// Builds the URL for an endpoint path under the route prefix.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidRequest("base url cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(path.split('/'));
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends one request and enforces a success status.
    fn send(
        &self,
        operation: GatewayOperation,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(path, query)?;
        let log_path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        let response = match request.send() {
            Ok(response) => response,
            Err(err) => {
                let message = err.to_string();
                self.log(operation, &log_path, None, Some(&message));
                return Err(GatewayError::Transport {
                    operation,
                    message,
                });
            }
        };
        let status = response.status();
        let body = match response.bytes() {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                let message = format!("failed to read response body: {err}");
                self.log(operation, &log_path, Some(status.as_u16()), Some(&message));
                return Err(GatewayError::Transport {
                    operation,
                    message,
                });
            }
        };
        if !status.is_success() {
            let failure = operation.failure(status.as_u16(), &body);
            self.log(operation, &log_path, Some(status.as_u16()), Some(&failure.to_string()));
            return Err(failure);
        }
        self.log(operation, &log_path, Some(status.as_u16()), None);
        Ok(GatewayResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Records a `gateway_request` event.
    fn log(&self, operation: GatewayOperation, path: &str, status: Option<u16>, error: Option<&str>) {
        let outcome = if error.is_some() { EventOutcome::Error } else { EventOutcome::Ok };
        let mut event =
            HarnessEvent::new("gateway_request", outcome).operation(operation.as_str()).path(path);
        if let Some(status) = status {
            event = event.status(status);
        }
        if let Some(error) = error {
            event = event.detail(error);
        }
        self.sink.record(&event);
    }
}
