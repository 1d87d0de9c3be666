// crates/hierarchy-authz-core/src/runtime/effective.rs
// ============================================================================
// Module: Effective Role
// Description: Highest role a user effectively holds on one address.
// Purpose: Summarize resolved grants for display and permission listing.
// Dependencies: crate::core, crate::runtime::resolver, serde
// ============================================================================

//! ## Overview
//! The effective role on an address is the highest rank, in the family pinned
//! to the address level, whose threshold check is granted there by the
//! resolver. The wildcard address is evaluated with the organization family.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::AnyPermission;
use crate::core::HierarchyAddress;
use crate::core::PermissionCheck;
use crate::core::Role;
use crate::core::RoleAssignment;
use crate::core::RoleFamily;
use crate::core::RoleRank;
use crate::runtime::resolver::HierarchyPermissions;
use crate::runtime::resolver::ResolutionError;

// ============================================================================
// SECTION: Effective Role
// ============================================================================

/// Effective role of a user on an address.
///
/// # Invariants
/// - When present, `role` belongs to the family pinned to `address`'s level,
///   or to the organization family for the wildcard address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRole {
    /// Address the role was resolved for.
    pub address: HierarchyAddress,
    /// Whether the user holds the superuser grant.
    pub is_superuser: bool,
    /// Highest granted role, if any.
    pub role: Option<Role>,
}

impl EffectiveRole {
    /// Returns true when `permission` is held on the address.
    #[must_use]
    pub fn allows(&self, permission: &AnyPermission) -> bool {
        if self.is_superuser {
            return true;
        }
        self.role.is_some_and(|role| {
            role.family() == permission.family() && role.rank() >= permission.min_rank()
        })
    }

    /// Returns the permissions held on the address, as text.
    #[must_use]
    pub fn permission_names(&self) -> Vec<String> {
        let Some(role) = self.role else {
            return Vec::new();
        };
        let held: Vec<AnyPermission> = match role {
            Role::Organization(role) => role.permissions().into_iter().map(AnyPermission::from).collect(),
            Role::Product(role) => role.permissions().into_iter().map(AnyPermission::from).collect(),
            Role::Repository(role) => role.permissions().into_iter().map(AnyPermission::from).collect(),
        };
        held.iter().map(ToString::to_string).collect()
    }
}

/// Resolves the effective role of the assignments' holder on `target`.
///
/// # Errors
///
/// Returns [`ResolutionError`] when the assignments are structurally invalid.
pub fn effective_role(
    assignments: &[RoleAssignment],
    target: &HierarchyAddress,
) -> Result<EffectiveRole, ResolutionError> {
    let family = RoleFamily::for_level(target.level()).unwrap_or(RoleFamily::Organization);
    let mut is_superuser = false;
    let mut role = None;
    for rank in RoleRank::ALL.into_iter().rev() {
        let candidate = Role::new(family, rank);
        let permissions = HierarchyPermissions::new(assignments, PermissionCheck::for_role(candidate))?;
        is_superuser = permissions.is_superuser();
        if permissions.has_permission(target) {
            role = Some(candidate);
            break;
        }
    }
    Ok(EffectiveRole {
        address: *target,
        is_superuser,
        role,
    })
}
