// crates/hierarchy-authz-core/src/core/assignment.rs
// ============================================================================
// Module: Role Assignments
// Description: A user's role on one hierarchy address.
// Purpose: Carry assignment triples between stores and the resolver.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`RoleAssignment`] states that a user holds a role on an address. The
//! single superuser grant is `OrganizationRole::Admin` on the wildcard
//! address; see [`RoleAssignment::superuser`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hierarchy::HierarchyAddress;
use crate::core::identifiers::UserId;
use crate::core::roles::OrganizationRole;
use crate::core::roles::Role;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Role recognized as the superuser grant when placed on the wildcard address.
pub const SUPERUSER_ROLE: Role = Role::Organization(OrganizationRole::Admin);

// ============================================================================
// SECTION: Assignment
// ============================================================================

/// A role held by a user on one hierarchy address.
///
/// # Invariants
/// - Values are immutable inputs to resolution; structural validity is
///   checked when the resolver is built, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Role held.
    pub role: Role,
    /// Address the role is held on.
    pub address: HierarchyAddress,
}

impl RoleAssignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>, role: impl Into<Role>, address: HierarchyAddress) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            address,
        }
    }

    /// Creates the superuser grant for `user_id`.
    #[must_use]
    pub fn superuser(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, SUPERUSER_ROLE, HierarchyAddress::Wildcard)
    }

    /// Returns true when this is the superuser grant.
    #[must_use]
    pub fn is_superuser_marker(&self) -> bool {
        self.address == HierarchyAddress::Wildcard && self.role == SUPERUSER_ROLE
    }
}
