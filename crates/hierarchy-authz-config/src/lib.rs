// crates/hierarchy-authz-config/src/lib.rs
// ============================================================================
// Module: Hierarchy Authz Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for hierarchy-authz.toml semantics.
// Dependencies: hierarchy-authz-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `hierarchy-authz-config` defines the configuration model for the
//! hierarchy-authz tools: where assignments are stored, how migration groups
//! are named and where their snapshots live, and where audit events go.
//! Validation is strict and fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
