// system-tests/src/lib.rs
// ============================================================================
// Module: Tag CI/CD System Tests Library
// Description: Shared configuration for live round-trip scenarios.
// Purpose: Provide run-root settings used by system-test binaries.
// Dependencies: tag-cicd-harness
// ============================================================================

//! ## Overview
//! This crate hosts configuration shared by the system-test binaries in
//! `system-tests/tests`. Those binaries need a live gateway and are gated
//! behind the `system-tests` feature.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
