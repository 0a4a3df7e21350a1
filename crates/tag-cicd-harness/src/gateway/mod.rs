// crates/tag-cicd-harness/src/gateway/mod.rs
// ============================================================================
// Module: Gateway Client
// Description: HTTP client for the gateway tag import/export routes.
// Purpose: Issue import, export, delete, and mode queries against a live gateway.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The gateway exposes its tag routes under a module prefix such as
//! `/data/tag-cicd`. Every call here is one blocking request with no retry: a
//! transient failure is surfaced immediately and ends the scenario.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod client;
mod params;
mod reports;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::GatewayClient;
pub use client::GatewayError;
pub use client::GatewayOperation;
pub use params::CollisionPolicy;
pub use params::ExportMode;
pub use params::ExportRequest;
pub use params::ImportPayload;
pub use params::InlineExport;
pub use reports::DeleteReport;
pub use reports::ExportModeInfo;
pub use reports::ExportReport;
pub use reports::ImportReport;
pub use reports::QualityMap;
pub use reports::is_good_quality;
