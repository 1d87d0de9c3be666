// crates/hierarchy-authz-migration/src/lib.rs
// ============================================================================
// Module: Hierarchy Authz Migration Library
// Description: Import of directory group roles into native assignments.
// Purpose: Expose the migration job, its collaborators, and audit sinks.
// Dependencies: crate::{audit, catalog, directory, migration, naming}
// ============================================================================

//! ## Overview
//! Deployments that used to keep roles as identity-provider group
//! memberships run this migration once to seed the native assignment store.
//! Group names follow the [`GroupNaming`] convention; nodes come from a
//! [`HierarchyCatalog`] and memberships from a [`GroupDirectory`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod directory;
pub mod migration;
pub mod naming;
mod snapshot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileMigrationAuditSink;
pub use audit::MigrationAuditEvent;
pub use audit::MigrationAuditSink;
pub use audit::MigrationTotals;
pub use audit::NoopMigrationAuditSink;
pub use audit::StderrMigrationAuditSink;
pub use catalog::CatalogError;
pub use catalog::HierarchyCatalog;
pub use catalog::StaticHierarchyCatalog;
pub use directory::DirectoryError;
pub use directory::GroupDirectory;
pub use directory::StaticGroupDirectory;
pub use migration::MigrationError;
pub use migration::MigrationOutcome;
pub use migration::RoleMigration;
pub use naming::DEFAULT_SUPERUSER_GROUP;
pub use naming::GroupKind;
pub use naming::GroupNaming;
pub use snapshot::MAX_SNAPSHOT_BYTES;
