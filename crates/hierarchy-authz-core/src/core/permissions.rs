// crates/hierarchy-authz-core/src/core/permissions.rs
// ============================================================================
// Module: Permission Catalog
// Description: Named permissions per role family and permission checks.
// Purpose: Turn an action's required permissions into a role predicate.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every permission belongs to one role family and names the minimum rank in
//! that family that holds it. A [`PermissionCheck`] is the predicate
//! `role.family == family && role.rank >= required`, where `required` is the
//! maximum minimum-rank across the requested permissions.
//!
//! Security posture: a check never matches a role of another family. Textual
//! input is parsed fail-closed; see [`PermissionCheck::parse`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::roles::OrganizationRole;
use crate::core::roles::ProductRole;
use crate::core::roles::RepositoryRole;
use crate::core::roles::Role;
use crate::core::roles::RoleFamily;
use crate::core::roles::RoleRank;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building permission checks from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// No permissions were supplied.
    #[error("at least one permission is required")]
    Empty,
    /// Permissions from more than one family were supplied.
    #[error("permissions span multiple role families: {0} and {1}")]
    MixedFamilies(RoleFamily, RoleFamily),
    /// The permission name is not recognized.
    #[error("unknown permission: {0}")]
    Unknown(String),
}

// ============================================================================
// SECTION: Permission Trait
// ============================================================================

/// A named permission of one role family.
pub trait Permission: Copy {
    /// Family the permission belongs to.
    const FAMILY: RoleFamily;

    /// Returns the lowest rank in [`Self::FAMILY`] that holds the permission.
    fn min_rank(self) -> RoleRank;

    /// Returns the lowercase permission name.
    fn name(self) -> &'static str;
}

/// Declares one permission enum with its catalog entries.
macro_rules! permission_catalog {
    (
        $(#[$meta:meta])*
        $name:ident, $role:ident, $family:expr,
        { $($(#[$vmeta:meta])* $variant:ident => ($label:literal, $rank:ident)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every permission of the family in catalog order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Resolves a permission name case-insensitively.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|permission| permission.name().eq_ignore_ascii_case(name))
            }
        }

        impl Permission for $name {
            const FAMILY: RoleFamily = $family;

            fn min_rank(self) -> RoleRank {
                match self {
                    $(Self::$variant => RoleRank::$rank,)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl $role {
            /// Returns the permissions held by this role.
            #[must_use]
            pub fn permissions(self) -> Vec<$name> {
                $name::ALL
                    .iter()
                    .copied()
                    .filter(|permission| permission.min_rank() <= self.rank())
                    .collect()
            }
        }
    };
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

permission_catalog!(
    /// Permissions on organizations.
    OrganizationPermission, OrganizationRole, RoleFamily::Organization,
    {
        /// View the organization.
        Read => ("read", Reader),
        /// List the organization's products.
        ReadProducts => ("read_products", Reader),
        /// Modify the organization.
        Write => ("write", Writer),
        /// Modify organization secrets.
        WriteSecrets => ("write_secrets", Writer),
        /// Create products inside the organization.
        CreateProduct => ("create_product", Writer),
        /// Manage role assignments on the organization.
        ManageGroups => ("manage_groups", Admin),
        /// Delete the organization.
        Delete => ("delete", Admin),
    }
);

permission_catalog!(
    /// Permissions on products.
    ProductPermission, ProductRole, RoleFamily::Product,
    {
        /// View the product.
        Read => ("read", Reader),
        /// List the product's repositories.
        ReadRepositories => ("read_repositories", Reader),
        /// Modify the product.
        Write => ("write", Writer),
        /// Modify product secrets.
        WriteSecrets => ("write_secrets", Writer),
        /// Create repositories inside the product.
        CreateRepository => ("create_repository", Writer),
        /// Trigger runs for every repository of the product.
        TriggerRun => ("trigger_run", Writer),
        /// Manage role assignments on the product.
        ManageGroups => ("manage_groups", Admin),
        /// Delete the product.
        Delete => ("delete", Admin),
    }
);

permission_catalog!(
    /// Permissions on repositories.
    RepositoryPermission, RepositoryRole, RoleFamily::Repository,
    {
        /// View the repository.
        Read => ("read", Reader),
        /// View the repository's runs.
        ReadRuns => ("read_runs", Reader),
        /// Modify the repository.
        Write => ("write", Writer),
        /// Modify repository secrets.
        WriteSecrets => ("write_secrets", Writer),
        /// Trigger a run for the repository.
        TriggerRun => ("trigger_run", Writer),
        /// Manage role assignments on the repository.
        ManageGroups => ("manage_groups", Admin),
        /// Delete the repository.
        Delete => ("delete", Admin),
    }
);

// ============================================================================
// SECTION: Any Permission
// ============================================================================

/// A permission of any family, used at text boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "permission", rename_all = "snake_case")]
pub enum AnyPermission {
    /// Organization permission.
    Organization(OrganizationPermission),
    /// Product permission.
    Product(ProductPermission),
    /// Repository permission.
    Repository(RepositoryPermission),
}

impl AnyPermission {
    /// Returns the family of the permission.
    #[must_use]
    pub const fn family(&self) -> RoleFamily {
        match self {
            Self::Organization(_) => RoleFamily::Organization,
            Self::Product(_) => RoleFamily::Product,
            Self::Repository(_) => RoleFamily::Repository,
        }
    }

    /// Returns the minimum rank holding the permission.
    #[must_use]
    pub fn min_rank(&self) -> RoleRank {
        match *self {
            Self::Organization(permission) => permission.min_rank(),
            Self::Product(permission) => permission.min_rank(),
            Self::Repository(permission) => permission.min_rank(),
        }
    }

    /// Returns the permission name without the family prefix.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match *self {
            Self::Organization(permission) => permission.name(),
            Self::Product(permission) => permission.name(),
            Self::Repository(permission) => permission.name(),
        }
    }
}

impl fmt::Display for AnyPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family(), self.name())
    }
}

impl FromStr for AnyPermission {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let unknown = || PermissionError::Unknown(trimmed.to_string());
        let (family, name) = trimmed.split_once(':').ok_or_else(unknown)?;
        match RoleFamily::from_label(family).ok_or_else(unknown)? {
            RoleFamily::Organization => {
                OrganizationPermission::from_name(name).map(Self::Organization).ok_or_else(unknown)
            }
            RoleFamily::Product => {
                ProductPermission::from_name(name).map(Self::Product).ok_or_else(unknown)
            }
            RoleFamily::Repository => {
                RepositoryPermission::from_name(name).map(Self::Repository).ok_or_else(unknown)
            }
        }
    }
}

impl From<OrganizationPermission> for AnyPermission {
    fn from(value: OrganizationPermission) -> Self {
        Self::Organization(value)
    }
}

impl From<ProductPermission> for AnyPermission {
    fn from(value: ProductPermission) -> Self {
        Self::Product(value)
    }
}

impl From<RepositoryPermission> for AnyPermission {
    fn from(value: RepositoryPermission) -> Self {
        Self::Repository(value)
    }
}

// ============================================================================
// SECTION: Permission Check
// ============================================================================

/// Predicate deciding whether a role satisfies a set of required permissions.
///
/// # Invariants
/// - Roles outside `family` never satisfy the check.
/// - Satisfaction is monotonic in rank within `family`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionCheck {
    /// Family the check applies to.
    family: RoleFamily,
    /// Lowest rank that satisfies the check.
    required: RoleRank,
}

impl PermissionCheck {
    /// Builds a check requiring every permission in `permissions`.
    ///
    /// An empty slice requires the family's lowest rank.
    #[must_use]
    pub fn for_permissions<P: Permission>(permissions: &[P]) -> Self {
        let required =
            permissions.iter().map(|permission| permission.min_rank()).max().unwrap_or(RoleRank::Reader);
        Self {
            family: P::FAMILY,
            required,
        }
    }

    /// Builds a check using `role` as the threshold.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        Self {
            family: role.family(),
            required: role.rank(),
        }
    }

    /// Builds a check from permissions of any family.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Empty`] for an empty slice and
    /// [`PermissionError::MixedFamilies`] when families differ.
    pub fn for_any(permissions: &[AnyPermission]) -> Result<Self, PermissionError> {
        let Some(first) = permissions.first() else {
            return Err(PermissionError::Empty);
        };
        let family = first.family();
        let mut required = first.min_rank();
        for permission in &permissions[1 ..] {
            if permission.family() != family {
                return Err(PermissionError::MixedFamilies(family, permission.family()));
            }
            required = required.max(permission.min_rank());
        }
        Ok(Self {
            family,
            required,
        })
    }

    /// Parses textual permissions such as `repository:write`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError`] when a name is unknown, the input is empty,
    /// or the permissions span more than one family.
    pub fn parse(permissions: &[&str]) -> Result<Self, PermissionError> {
        let parsed =
            permissions.iter().map(|text| text.parse::<AnyPermission>()).collect::<Result<Vec<_>, _>>()?;
        Self::for_any(&parsed)
    }

    /// Returns true when `role` satisfies this check.
    #[must_use]
    pub fn allows(&self, role: &Role) -> bool {
        role.family() == self.family && role.rank() >= self.required
    }

    /// Returns the family this check applies to.
    #[must_use]
    pub const fn family(&self) -> RoleFamily {
        self.family
    }

    /// Returns the lowest satisfying rank.
    #[must_use]
    pub const fn required_rank(&self) -> RoleRank {
        self.required
    }

    /// Returns the lowest satisfying role.
    #[must_use]
    pub const fn threshold(&self) -> Role {
        Role::new(self.family, self.required)
    }
}

impl From<Role> for PermissionCheck {
    fn from(role: Role) -> Self {
        Self::for_role(role)
    }
}
