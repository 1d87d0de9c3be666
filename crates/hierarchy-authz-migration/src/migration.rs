// crates/hierarchy-authz-migration/src/migration.rs
// ============================================================================
// Module: Role Migration
// Description: One-shot conversion of directory groups into role assignments.
// Purpose: Seed an empty assignment store from external group membership.
// Dependencies: hierarchy-authz-core, thiserror
// ============================================================================

//! ## Overview
//! [`RoleMigration`] runs only against an empty store. It walks every node
//! the catalog lists, reads the reader, writer, and admin groups of that node
//! and then the superuser group, and writes one assignment per member. A
//! group the directory cannot serve is audited and skipped; catalog and store
//! failures abort the run.
//!
//! The empty-store check and the writes are not atomic. Callers must make
//! sure only one migration runs at a time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::RoleAssignment;
use hierarchy_authz_core::RoleAssignmentStore;
use hierarchy_authz_core::RoleFamily;
use hierarchy_authz_core::RoleRank;
use hierarchy_authz_core::SUPERUSER_ROLE;
use hierarchy_authz_core::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::audit::MigrationAuditEvent;
use crate::audit::MigrationAuditSink;
use crate::audit::MigrationTotals;
use crate::audit::NoopMigrationAuditSink;
use crate::catalog::CatalogError;
use crate::catalog::HierarchyCatalog;
use crate::directory::GroupDirectory;
use crate::naming::GroupNaming;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that abort a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// The catalog could not list nodes.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The assignment store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The catalog listed a node that cannot carry role groups.
    #[error("invalid migration input: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of a migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    /// False when the store already held assignments and nothing ran.
    pub migrated: bool,
    /// Run counters; all zero when `migrated` is false.
    #[serde(flatten)]
    pub totals: MigrationTotals,
}

/// A directory group and the assignment its members receive.
struct PlannedGroup {
    /// Directory group name.
    name: String,
    /// Role granted to members.
    role: Role,
    /// Node the role is granted on.
    address: HierarchyAddress,
}

// ============================================================================
// SECTION: Migration Job
// ============================================================================

/// Directory-to-store role migration.
///
/// # Invariants
/// - Writes happen only when the store was empty at the start of the run.
pub struct RoleMigration<S, D, C> {
    /// Destination store.
    store: S,
    /// Source of group memberships.
    directory: D,
    /// Source of hierarchy nodes.
    catalog: C,
    /// Group naming convention.
    naming: GroupNaming,
    /// Audit sink for run events.
    audit: Arc<dyn MigrationAuditSink>,
}

impl<S, D, C> RoleMigration<S, D, C>
where
    S: RoleAssignmentStore,
    D: GroupDirectory,
    C: HierarchyCatalog,
{
    /// Creates a migration with the default naming and no audit output.
    #[must_use]
    pub fn new(store: S, directory: D, catalog: C) -> Self {
        Self {
            store,
            directory,
            catalog,
            naming: GroupNaming::default(),
            audit: Arc::new(NoopMigrationAuditSink),
        }
    }

    /// Replaces the group naming convention.
    #[must_use]
    pub fn with_naming(mut self, naming: GroupNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn MigrationAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the destination store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Runs the migration and reports whether it applied.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when the catalog or the store fails.
    pub fn migrate(&self) -> Result<bool, MigrationError> {
        self.run().map(|outcome| outcome.migrated)
    }

    /// Runs the migration and returns its counters.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when the catalog or the store fails. Writes
    /// made before the failure are kept.
    pub fn run(&self) -> Result<MigrationOutcome, MigrationError> {
        if self.store.has_any_assignment()? {
            self.audit.record(&MigrationAuditEvent::not_applicable());
            return Ok(MigrationOutcome::default());
        }
        self.audit.record(&MigrationAuditEvent::started());

        let mut totals = MigrationTotals::default();
        for group in self.plan()? {
            let members = match self.directory.group_members(&group.name) {
                Ok(members) => members,
                Err(err) => {
                    totals.groups_skipped += 1;
                    self.audit.record(&MigrationAuditEvent::group_skipped(&group.name, err.to_string()));
                    continue;
                }
            };
            for member in &members {
                let assignment = RoleAssignment::new(member.clone(), group.role, group.address);
                self.store.create_assignment(&assignment)?;
                totals.assignments_created += 1;
            }
            totals.groups_processed += 1;
            self.audit.record(&MigrationAuditEvent::group_migrated(
                &group.name,
                group.role.to_string(),
                group.address.to_string(),
                members.len(),
            ));
        }

        self.audit.record(&MigrationAuditEvent::completed(totals));
        Ok(MigrationOutcome {
            migrated: true,
            totals,
        })
    }

    /// Lists the groups to read, in write order.
    fn plan(&self) -> Result<Vec<PlannedGroup>, MigrationError> {
        let mut groups = Vec::new();
        for address in self.catalog.list_addresses()? {
            let family = RoleFamily::for_level(address.level())
                .ok_or_else(|| MigrationError::Invalid(format!("catalog node {address} has no role family")))?;
            for rank in RoleRank::ALL {
                let role = Role::new(family, rank);
                let name = self.naming.group_name(role, &address).ok_or_else(|| {
                    MigrationError::Invalid(format!("no group name for {role} on {address}"))
                })?;
                groups.push(PlannedGroup {
                    name,
                    role,
                    address,
                });
            }
        }
        groups.push(PlannedGroup {
            name: self.naming.superuser_group_name(),
            role: SUPERUSER_ROLE,
            address: HierarchyAddress::Wildcard,
        });
        Ok(groups)
    }
}
