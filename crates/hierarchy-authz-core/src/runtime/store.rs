// crates/hierarchy-authz-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Role Assignment Store
// Description: Mutex-guarded role assignment store for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`RoleAssignmentStore`] for tests and local demos. It is not intended for
//! production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::HierarchyAddress;
use crate::core::Role;
use crate::core::RoleAssignment;
use crate::core::RoleFamily;
use crate::core::UserId;
use crate::interfaces::RoleAssignmentStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Assignment map keyed by user, address, then role family.
type AssignmentMap = BTreeMap<AssignmentKey, Role>;

/// One slot per user, node, and role family.
type AssignmentKey = (UserId, HierarchyAddress, RoleFamily);

/// In-memory role assignment store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRoleAssignmentStore {
    /// Assignment map protected by a mutex.
    assignments: Arc<Mutex<AssignmentMap>>,
}

impl InMemoryRoleAssignmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignments: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Creates a store seeded with `assignments`; later entries replace
    /// earlier ones for the same user, address, and role family.
    #[must_use]
    pub fn with_assignments(assignments: impl IntoIterator<Item = RoleAssignment>) -> Self {
        let map = assignments
            .into_iter()
            .map(|assignment| {
                let family = assignment.role.family();
                ((assignment.user_id, assignment.address, family), assignment.role)
            })
            .collect();
        Self {
            assignments: Arc::new(Mutex::new(map)),
        }
    }

    /// Returns the number of stored assignments.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the mutex is poisoned.
    pub fn assignment_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Locks the assignment map.
    fn lock(&self) -> Result<MutexGuard<'_, AssignmentMap>, StoreError> {
        self.assignments
            .lock()
            .map_err(|_| StoreError::Store("role assignment store mutex poisoned".to_string()))
    }
}

impl RoleAssignmentStore for InMemoryRoleAssignmentStore {
    fn list_assignments_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .iter()
            .filter(|((user, _, _), _)| user == user_id)
            .map(|((user, address, _), role)| RoleAssignment::new(user.clone(), *role, *address))
            .collect())
    }

    fn has_any_assignment(&self) -> Result<bool, StoreError> {
        Ok(!self.lock()?.is_empty())
    }

    fn create_assignment(&self, assignment: &RoleAssignment) -> Result<(), StoreError> {
        let key = (assignment.user_id.clone(), assignment.address, assignment.role.family());
        self.lock()?.insert(key, assignment.role);
        Ok(())
    }

    fn remove_assignment(&self, user_id: &UserId, address: &HierarchyAddress) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|(user, stored_address, _), _| !(user == user_id && stored_address == address));
        Ok(guard.len() < before)
    }

    fn list_users_with_role(
        &self,
        role: &Role,
        address: &HierarchyAddress,
    ) -> Result<BTreeSet<UserId>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .iter()
            .filter(|((_, stored_address, _), stored_role)| stored_address == address && *stored_role == role)
            .map(|((user, _, _), _)| user.clone())
            .collect())
    }
}
