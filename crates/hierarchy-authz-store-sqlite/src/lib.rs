// crates/hierarchy-authz-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Role Assignment Store
// Description: Durable RoleAssignmentStore backend using SQLite.
// Purpose: Persist role assignments across process restarts.
// Dependencies: hierarchy-authz-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`RoleAssignmentStore`] implementation.
//! Roles are persisted as `(level, name)` pairs and addresses as nullable
//! identifier columns; both are rebuilt on load and fail closed when they
//! cannot be. Security posture: database contents are untrusted.
//!
//! [`RoleAssignmentStore`]: hierarchy_authz_core::RoleAssignmentStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::SqliteRoleAssignmentStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
