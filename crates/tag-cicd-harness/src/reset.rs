// crates/tag-cicd-harness/src/reset.rs
// ============================================================================
// Module: State Reset Controller
// Description: Clears the gateway tag store before every scenario.
// Purpose: Keep scenarios independent of each other's leftover tags.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Reset deletes the root of each configured provider recursively, requires
//! every reported quality code to be `Good`, then exports the provider inline
//! and requires the result to hold no tags (an empty `_types_` folder is
//! allowed). Any failure aborts the scenario before import. Reset is a setup
//! step; nothing in the harness tears down after a scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::equivalence::remaining_tags;
use crate::gateway::GatewayClient;
use crate::gateway::GatewayError;
use crate::gateway::InlineExport;
use crate::logging::EventOutcome;
use crate::logging::HarnessEvent;
use crate::logging::HarnessLogSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag path addressing a provider's root.
const ROOT_TAG_PATH: &str = "";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reset failures. Each aborts the scenario before import.
#[derive(Debug, Error)]
pub enum ResetFailure {
    /// The delete call failed.
    #[error("reset of provider {provider} failed: {source}")]
    Request {
        /// Provider being cleared.
        provider: String,
        /// Gateway failure.
        source: GatewayError,
    },
    /// The gateway reported a non-`Good` quality for a deletion.
    #[error("reset of provider {provider} rejected {path} with quality {code}")]
    Rejected {
        /// Provider being cleared.
        provider: String,
        /// Tag path reported by the gateway.
        path: String,
        /// Quality code reported.
        code: String,
    },
    /// The verification export could not be taken.
    #[error("reset verification of provider {provider} failed: {source}")]
    Verify {
        /// Provider being verified.
        provider: String,
        /// Gateway failure.
        source: GatewayError,
    },
    /// Tags remain after deletion.
    #[error("provider {provider} still holds tags after reset: {}", remaining.join(", "))]
    NotEmpty {
        /// Provider being verified.
        provider: String,
        /// Top-level tag names still present.
        remaining: Vec<String>,
    },
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Empties the gateway tag store for a set of providers.
pub struct ResetController {
    /// Gateway used for delete and verification calls.
    client: Arc<GatewayClient>,
    /// Providers cleared on every reset, in order.
    providers: Vec<String>,
    /// Whether to confirm emptiness with an inline export.
    verify: bool,
    /// Event sink for reset outcomes.
    sink: Arc<dyn HarnessLogSink>,
}

impl ResetController {
    /// Creates a verifying controller for one provider.
    #[must_use]
    pub fn new(
        client: Arc<GatewayClient>,
        provider: impl Into<String>,
        sink: Arc<dyn HarnessLogSink>,
    ) -> Self {
        Self {
            client,
            providers: vec![provider.into()],
            verify: true,
            sink,
        }
    }

    /// Adds another provider to clear.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.providers.push(provider.into());
        self
    }

    /// Enables or disables the verification export.
    #[must_use]
    pub const fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Returns the providers cleared on reset.
    #[must_use]
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Removes every tag from every configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`ResetFailure`] when a delete fails or is rejected, or when the
    /// store is not empty afterwards.
    pub fn reset(&self) -> Result<(), ResetFailure> {
        for provider in &self.providers {
            let outcome = self.reset_provider(provider);
            let mut event = HarnessEvent::new(
                "reset",
                if outcome.is_ok() { EventOutcome::Ok } else { EventOutcome::Error },
            )
            .operation(provider.as_str());
            if let Err(err) = &outcome {
                event = event.detail(err.to_string());
            }
            self.sink.record(&event);
            outcome?;
        }
        Ok(())
    }

    /// Clears and verifies one provider.
    fn reset_provider(&self, provider: &str) -> Result<(), ResetFailure> {
        let report = self.client.delete_tags(provider, ROOT_TAG_PATH, true).map_err(|source| {
            ResetFailure::Request {
                provider: provider.to_string(),
                source,
            }
        })?;
        if let Some((path, code)) = report.first_rejection() {
            return Err(ResetFailure::Rejected {
                provider: provider.to_string(),
                path: path.to_string(),
                code: code.to_string(),
            });
        }
        if !self.verify {
            return Ok(());
        }
        let request = InlineExport {
            provider: Some(provider.to_string()),
            ..InlineExport::recursive(true)
        };
        let document = self.client.export_inline_with(&request).map_err(|source| {
            ResetFailure::Verify {
                provider: provider.to_string(),
                source,
            }
        })?;
        let remaining = remaining_tags(&document);
        if remaining.is_empty() {
            Ok(())
        } else {
            Err(ResetFailure::NotEmpty {
                provider: provider.to_string(),
                remaining,
            })
        }
    }
}
