// crates/hierarchy-authz-migration/src/naming.rs
// ============================================================================
// Module: Group Naming
// Description: Directory group names that encode a role on a node.
// Purpose: Map (role, address) pairs to group names and back.
// Dependencies: hierarchy-authz-core
// ============================================================================

//! ## Overview
//! Role groups are named `{prefix}{LEVEL}_{id}_{RANKS}`, for example
//! `ORGANIZATION_7_ADMINS` or `tenant_REPOSITORY_42_READERS`. The `id` is the
//! node's own identifier. The superuser group is `{prefix}{superuser_group}`.
//! The prefix lets several deployments share one directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::HierarchyLevel;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::RoleFamily;
use hierarchy_authz_core::RoleRank;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default name of the superuser group, before prefixing.
pub const DEFAULT_SUPERUSER_GROUP: &str = "SUPERUSERS";

// ============================================================================
// SECTION: Parsed Names
// ============================================================================

/// Meaning decoded from a group name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// The superuser group.
    Superuser,
    /// A role group for one node.
    Role {
        /// Role granted to members.
        role: Role,
        /// Level of the node.
        level: HierarchyLevel,
        /// Identifier of the node at `level`.
        node_id: u64,
    },
}

// ============================================================================
// SECTION: Naming Convention
// ============================================================================

/// Group naming convention for one deployment.
///
/// # Invariants
/// - Names are produced and parsed with the same prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNaming {
    /// Prefix applied to every group name.
    prefix: String,
    /// Unprefixed superuser group name.
    superuser_group: String,
}

impl Default for GroupNaming {
    fn default() -> Self {
        Self::new("", DEFAULT_SUPERUSER_GROUP)
    }
}

impl GroupNaming {
    /// Creates a naming convention.
    #[must_use]
    pub fn new(prefix: impl Into<String>, superuser_group: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            superuser_group: superuser_group.into(),
        }
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the prefixed superuser group name.
    #[must_use]
    pub fn superuser_group_name(&self) -> String {
        format!("{}{}", self.prefix, self.superuser_group)
    }

    /// Returns the group holding `role` on `address`.
    ///
    /// Returns `None` when the role family is not pinned to the address level.
    #[must_use]
    pub fn group_name(&self, role: Role, address: &HierarchyAddress) -> Option<String> {
        if role.level() != address.level() {
            return None;
        }
        let node_id = address.node_id()?;
        Some(format!(
            "{}{}_{}_{}",
            self.prefix,
            level_token(role.family()),
            node_id,
            rank_token(role.rank())
        ))
    }

    /// Decodes a group name produced by this convention.
    ///
    /// The migration itself only formats names. Decoding serves operators
    /// checking a directory export before a run: names that return `None`
    /// are never read.
    #[must_use]
    pub fn parse(&self, name: &str) -> Option<GroupKind> {
        let unprefixed = name.strip_prefix(self.prefix.as_str())?;
        if unprefixed == self.superuser_group {
            return Some(GroupKind::Superuser);
        }
        let (level, rest) = unprefixed.split_once('_')?;
        let (id, rank) = rest.rsplit_once('_')?;
        let family = RoleFamily::ALL.into_iter().find(|family| level_token(*family) == level)?;
        let rank = RoleRank::ALL.into_iter().find(|candidate| rank_token(*candidate) == rank)?;
        let node_id = id.parse::<u64>().ok()?;
        Some(GroupKind::Role {
            role: Role::new(family, rank),
            level: family.level(),
            node_id,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the uppercase level token of a family.
const fn level_token(family: RoleFamily) -> &'static str {
    match family {
        RoleFamily::Organization => "ORGANIZATION",
        RoleFamily::Product => "PRODUCT",
        RoleFamily::Repository => "REPOSITORY",
    }
}

/// Returns the plural rank token.
const fn rank_token(rank: RoleRank) -> &'static str {
    match rank {
        RoleRank::Reader => "READERS",
        RoleRank::Writer => "WRITERS",
        RoleRank::Admin => "ADMINS",
    }
}
