// crates/hierarchy-authz-core/src/interfaces/mod.rs
// ============================================================================
// Module: Hierarchy Authz Interfaces
// Description: Backend-agnostic role assignment storage contract.
// Purpose: Let the authorizer and migration run against any durable store.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The resolver itself is storage-free. Callers load a user's assignments
//! through [`RoleAssignmentStore`] for every decision. Implementations must
//! fail closed: a row that cannot be decoded is an error, never a silently
//! dropped grant or an invented one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::HierarchyAddress;
use crate::core::Role;
use crate::core::RoleAssignment;
use crate::core::UserId;

// ============================================================================
// SECTION: Role Assignment Store
// ============================================================================

/// Role assignment store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("role assignment store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or cannot be decoded.
    #[error("role assignment store corruption: {0}")]
    Corrupt(String),
    /// Stored schema version is incompatible.
    #[error("role assignment store version mismatch: {0}")]
    VersionMismatch(String),
    /// Input data is invalid.
    #[error("role assignment store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("role assignment store error: {0}")]
    Store(String),
}

/// Durable storage for role assignments.
///
/// # Invariants
/// - At most one role per `(user, address, role family)` is stored. Roles of
///   different families on the same node live side by side.
pub trait RoleAssignmentStore: Send + Sync {
    /// Lists every assignment held by `user_id`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails or a row cannot be decoded.
    fn list_assignments_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, StoreError>;

    /// Returns true when the store holds at least one assignment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be queried.
    fn has_any_assignment(&self) -> Result<bool, StoreError>;

    /// Stores `assignment`, replacing any role of the same family the user
    /// already holds on the same address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create_assignment(&self, assignment: &RoleAssignment) -> Result<(), StoreError>;

    /// Removes every role the user holds on `address`. Returns whether a row
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn remove_assignment(&self, user_id: &UserId, address: &HierarchyAddress) -> Result<bool, StoreError>;

    /// Lists users explicitly assigned `role` on `address`. Inherited roles
    /// are not included.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_users_with_role(
        &self,
        role: &Role,
        address: &HierarchyAddress,
    ) -> Result<BTreeSet<UserId>, StoreError>;
}
