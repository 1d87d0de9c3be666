// crates/hierarchy-authz-core/src/runtime/authorizer.rs
// ============================================================================
// Module: Authorizer
// Description: Store-backed authorization service.
// Purpose: Load a user's assignments per decision and resolve them.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`Authorizer`] glues a [`RoleAssignmentStore`] to the resolver. Every
//! decision loads the user's assignments afresh; nothing is cached.
//!
//! Security posture: store and validation errors propagate to the caller,
//! which must treat them as a denial.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::HierarchyAddress;
use crate::core::PermissionCheck;
use crate::core::Role;
use crate::core::RoleAssignment;
use crate::core::UserId;
use crate::interfaces::RoleAssignmentStore;
use crate::interfaces::StoreError;
use crate::runtime::effective::EffectiveRole;
use crate::runtime::effective::effective_role;
use crate::runtime::filter::HierarchyFilter;
use crate::runtime::resolver::HierarchyPermissions;
use crate::runtime::resolver::ResolutionError;
use crate::runtime::resolver::validate_assignment;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authorizer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizerError {
    /// The assignment store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Assignments failed structural validation.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

// ============================================================================
// SECTION: Authorizer
// ============================================================================

/// Authorization service over a role assignment store.
#[derive(Debug, Clone)]
pub struct Authorizer<S> {
    /// Backing assignment store.
    store: S,
}

impl<S: RoleAssignmentStore> Authorizer<S> {
    /// Creates an authorizer over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolves the user's permissions for `check`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError`] when loading or validation fails.
    pub fn permissions(
        &self,
        user_id: &UserId,
        check: PermissionCheck,
    ) -> Result<HierarchyPermissions, AuthorizerError> {
        let assignments = self.store.list_assignments_for_user(user_id)?;
        Ok(HierarchyPermissions::new(&assignments, check)?)
    }

    /// Returns true when `check` is granted to the user on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError`] when loading or validation fails.
    pub fn check_permission(
        &self,
        user_id: &UserId,
        target: &HierarchyAddress,
        check: PermissionCheck,
    ) -> Result<bool, AuthorizerError> {
        Ok(self.permissions(user_id, check)?.has_permission(target))
    }

    /// Returns the user's effective role on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError`] when loading or validation fails.
    pub fn effective_role(
        &self,
        user_id: &UserId,
        target: &HierarchyAddress,
    ) -> Result<EffectiveRole, AuthorizerError> {
        let assignments = self.store.list_assignments_for_user(user_id)?;
        Ok(effective_role(&assignments, target)?)
    }

    /// Builds the listing filter for the user and `check`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError`] when loading or validation fails.
    pub fn filter(
        &self,
        user_id: &UserId,
        check: PermissionCheck,
        contained_in: Option<&HierarchyAddress>,
    ) -> Result<HierarchyFilter, AuthorizerError> {
        let permissions = self.permissions(user_id, check)?;
        Ok(HierarchyFilter::build(&permissions, contained_in))
    }

    /// Grants `role` on `address`, replacing any role of the same family the
    /// user held there.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::Resolution`] when the role cannot be held on
    /// `address`, or [`AuthorizerError::Store`] when the write fails.
    pub fn assign_role(
        &self,
        user_id: &UserId,
        role: Role,
        address: HierarchyAddress,
    ) -> Result<(), AuthorizerError> {
        let assignment = RoleAssignment::new(user_id.clone(), role, address);
        validate_assignment(&assignment)?;
        self.store.create_assignment(&assignment)?;
        Ok(())
    }

    /// Removes the user's roles on `address`. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError`] when the write fails.
    pub fn remove_assignment(
        &self,
        user_id: &UserId,
        address: &HierarchyAddress,
    ) -> Result<bool, AuthorizerError> {
        Ok(self.store.remove_assignment(user_id, address)?)
    }

    /// Lists users explicitly holding `role` on `address`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError`] when loading fails.
    pub fn list_users_with_role(
        &self,
        role: &Role,
        address: &HierarchyAddress,
    ) -> Result<BTreeSet<UserId>, AuthorizerError> {
        Ok(self.store.list_users_with_role(role, address)?)
    }
}
