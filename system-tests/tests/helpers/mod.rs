// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for tag round-trip system tests.
// Purpose: Provide harness construction, fixture names, and artifact utilities.
// Dependencies: system-tests, tag-cicd-harness
// ============================================================================

//! ## Overview
//! Shared helpers for tag round-trip system tests.
//! Invariants:
//! - Every scenario starts from a reset tag store.
//! - Scenarios run one at a time against the shared gateway.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
