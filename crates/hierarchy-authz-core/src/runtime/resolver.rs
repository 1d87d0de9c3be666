// crates/hierarchy-authz-core/src/runtime/resolver.rs
// ============================================================================
// Module: Hierarchy Permission Resolver
// Description: Grant resolution over hierarchical role assignments.
// Purpose: Answer access and visibility queries for one user and one check.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`HierarchyPermissions`] is built from a user's assignments and one
//! [`PermissionCheck`]. Construction validates the assignments, then derives:
//! - satisfied roots: addresses whose assigned role passes the check,
//! - dominant roots: satisfied roots with no satisfied strict ancestor,
//! - implicit roots: strict ancestors of dominant roots.
//!
//! Grants flow down the tree and visibility flows up. A satisfied root
//! authorizes every address it is related to in either direction, and a
//! weaker grant elsewhere never narrows a stronger one.
//!
//! Security posture: invalid assignments are rejected at construction; once
//! built, every query is total and deny-by-default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::HierarchyAddress;
use crate::core::HierarchyLevel;
use crate::core::PermissionCheck;
use crate::core::Role;
use crate::core::RoleAssignment;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Addresses grouped by their own level.
///
/// Levels without addresses are absent rather than mapped to empty lists.
pub type IdsByLevel = BTreeMap<HierarchyLevel, Vec<HierarchyAddress>>;

/// Errors raised while validating assignments for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A role other than the superuser role was placed on the wildcard.
    #[error("role {role} is not valid on the wildcard address")]
    WildcardRole {
        /// Offending role.
        role: Role,
    },
    /// A role was placed below the level its family is pinned to.
    #[error("role {role} cannot be held on {address}: below the {} level", .role.level())]
    BelowFamilyLevel {
        /// Offending role.
        role: Role,
        /// Address the role was placed on.
        address: HierarchyAddress,
    },
}

// ============================================================================
// SECTION: Hierarchy Permissions
// ============================================================================

/// Resolved permissions of one user for one permission check.
///
/// # Invariants
/// - `dominant` is a subset of `satisfied`; both are sorted and deduplicated.
/// - `implicit` is disjoint from `satisfied`.
/// - When `superuser` is set, the satisfied/dominant/implicit lists are
///   ignored by every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyPermissions {
    /// Check the assignments were evaluated against.
    check: PermissionCheck,
    /// Whether the superuser grant was present.
    superuser: bool,
    /// Addresses whose assigned role passes the check.
    satisfied: Vec<HierarchyAddress>,
    /// Satisfied roots not covered by a broader satisfied root.
    dominant: Vec<HierarchyAddress>,
    /// Strict ancestors of dominant roots.
    implicit: Vec<HierarchyAddress>,
}

impl HierarchyPermissions {
    /// Resolves `assignments` against `check`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] when an assignment places a role on an
    /// address its family cannot be held on.
    pub fn new(assignments: &[RoleAssignment], check: PermissionCheck) -> Result<Self, ResolutionError> {
        for assignment in assignments {
            validate_assignment(assignment)?;
        }
        let superuser = assignments.iter().any(RoleAssignment::is_superuser_marker);

        let satisfied: Vec<HierarchyAddress> = assignments
            .iter()
            .filter(|assignment| check.allows(&assignment.role))
            .map(|assignment| assignment.address)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let dominant: Vec<HierarchyAddress> = satisfied
            .iter()
            .copied()
            .filter(|root| !satisfied.iter().any(|other| other.is_strict_ancestor_of(root)))
            .collect();

        let implicit: Vec<HierarchyAddress> = dominant
            .iter()
            .flat_map(HierarchyAddress::ancestors)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self {
            check,
            superuser,
            satisfied,
            dominant,
            implicit,
        })
    }

    /// Returns true when the superuser grant was present.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.superuser
    }

    /// Returns true when access is granted on `target`.
    ///
    /// The wildcard target stands for every organization at once. Answering it
    /// from a grant on one organization would authorize all of them, so it is
    /// denied unless the superuser marker is present.
    #[must_use]
    pub fn has_permission(&self, target: &HierarchyAddress) -> bool {
        if self.superuser {
            return true;
        }
        if *target == HierarchyAddress::Wildcard {
            return false;
        }
        self.satisfied
            .iter()
            .any(|root| target.is_ancestor_or_self_of(root) || root.is_ancestor_or_self_of(target))
    }

    /// Returns the dominant roots grouped by level, for transitive filters.
    #[must_use]
    pub fn includes(&self) -> IdsByLevel {
        if self.superuser {
            return BTreeMap::from([(HierarchyLevel::Wildcard, vec![HierarchyAddress::Wildcard])]);
        }
        group_by_level(&self.dominant)
    }

    /// Returns ancestors visible only through deeper grants, for
    /// non-transitive filters.
    #[must_use]
    pub fn implicit_includes(&self) -> IdsByLevel {
        if self.superuser {
            return IdsByLevel::new();
        }
        group_by_level(&self.implicit)
    }

    /// Returns the check these permissions were resolved for.
    #[must_use]
    pub const fn check(&self) -> PermissionCheck {
        self.check
    }

    /// Returns every satisfied root, sorted.
    #[must_use]
    pub fn satisfied_roots(&self) -> &[HierarchyAddress] {
        &self.satisfied
    }

    /// Returns the dominant satisfied roots, sorted.
    #[must_use]
    pub fn dominant_roots(&self) -> &[HierarchyAddress] {
        &self.dominant
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects assignments whose role cannot be held on their address.
///
/// # Errors
///
/// Returns [`ResolutionError`] for a non-superuser role on the wildcard
/// address or a role placed below its family's level.
pub fn validate_assignment(assignment: &RoleAssignment) -> Result<(), ResolutionError> {
    let address = assignment.address;
    let role = assignment.role;
    if address == HierarchyAddress::Wildcard {
        if assignment.is_superuser_marker() {
            return Ok(());
        }
        return Err(ResolutionError::WildcardRole {
            role,
        });
    }
    if address.level() > role.level() {
        return Err(ResolutionError::BelowFamilyLevel {
            role,
            address,
        });
    }
    Ok(())
}

/// Groups sorted addresses by level, preserving order inside each level.
fn group_by_level(addresses: &[HierarchyAddress]) -> IdsByLevel {
    let mut grouped = IdsByLevel::new();
    for address in addresses {
        grouped.entry(address.level()).or_default().push(*address);
    }
    grouped
}
