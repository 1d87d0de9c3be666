// crates/hierarchy-authz-core/src/core/roles.rs
// ============================================================================
// Module: Role Families
// Description: Ranked roles for organizations, products, and repositories.
// Purpose: Keep role ranks comparable only within a single family.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Three closed role families exist, each pinned to one hierarchy level. Every
//! family has the ranks `READER < WRITER < ADMIN`. The family enums are
//! ordered, but [`Role`] (the union over families) is deliberately not, so a
//! cross-family comparison does not type-check.
//!
//! ## Textual forms
//! - Persisted rank names: `READER`, `WRITER`, `ADMIN` (see [`Role::lookup`]).
//! - Display form: `organization:admin`, `repository:reader`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hierarchy::HierarchyLevel;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing textual roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The family label is not recognized.
    #[error("unknown role family: {0}")]
    UnknownFamily(String),
    /// The rank label is not recognized.
    #[error("unknown role rank: {0}")]
    UnknownRank(String),
    /// The text is not of the form `family:rank`.
    #[error("invalid role: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Rank
// ============================================================================

/// Family-independent rank used for thresholds.
///
/// # Invariants
/// - Ordering is `Reader < Writer < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RoleRank {
    /// Read access.
    Reader,
    /// Write access.
    Writer,
    /// Administrative access.
    Admin,
}

impl RoleRank {
    /// All ranks, ascending.
    pub const ALL: [Self; 3] = [Self::Reader, Self::Writer, Self::Admin];

    /// Returns the persisted uppercase name (`READER`, `WRITER`, `ADMIN`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reader => "READER",
            Self::Writer => "WRITER",
            Self::Admin => "ADMIN",
        }
    }

    /// Returns the lowercase label used in textual roles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Admin => "admin",
        }
    }

    /// Resolves a persisted uppercase name. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.name() == name)
    }

    /// Resolves a label case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for RoleRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Family
// ============================================================================

/// Closed set of role families.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RoleFamily {
    /// Roles on organizations.
    Organization,
    /// Roles on products.
    Product,
    /// Roles on repositories.
    Repository,
}

impl RoleFamily {
    /// All families in level order.
    pub const ALL: [Self; 3] = [Self::Organization, Self::Product, Self::Repository];

    /// Returns the hierarchy level this family is pinned to.
    #[must_use]
    pub const fn level(self) -> HierarchyLevel {
        match self {
            Self::Organization => HierarchyLevel::Organization,
            Self::Product => HierarchyLevel::Product,
            Self::Repository => HierarchyLevel::Repository,
        }
    }

    /// Returns the family pinned to `level`. The wildcard level has none.
    #[must_use]
    pub const fn for_level(level: HierarchyLevel) -> Option<Self> {
        match level {
            HierarchyLevel::Wildcard => None,
            HierarchyLevel::Organization => Some(Self::Organization),
            HierarchyLevel::Product => Some(Self::Product),
            HierarchyLevel::Repository => Some(Self::Repository),
        }
    }

    /// Returns the lowercase family label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Product => "product",
            Self::Repository => "repository",
        }
    }

    /// Resolves a label case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for RoleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Family Roles
// ============================================================================

/// Declares one ordered role family enum with rank conversions.
macro_rules! role_family {
    ($(#[$meta:meta])* $name:ident, $family:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            /// Read access.
            Reader,
            /// Write access.
            Writer,
            /// Administrative access.
            Admin,
        }

        impl $name {
            /// All roles of the family, ascending.
            pub const ALL: [Self; 3] = [Self::Reader, Self::Writer, Self::Admin];
            /// Family this role belongs to.
            pub const FAMILY: RoleFamily = $family;

            /// Returns the family-independent rank.
            #[must_use]
            pub const fn rank(self) -> RoleRank {
                match self {
                    Self::Reader => RoleRank::Reader,
                    Self::Writer => RoleRank::Writer,
                    Self::Admin => RoleRank::Admin,
                }
            }

            /// Returns the role of this family with the given rank.
            #[must_use]
            pub const fn from_rank(rank: RoleRank) -> Self {
                match rank {
                    RoleRank::Reader => Self::Reader,
                    RoleRank::Writer => Self::Writer,
                    RoleRank::Admin => Self::Admin,
                }
            }
        }

        impl From<$name> for Role {
            fn from(value: $name) -> Self {
                Self::new(<$name>::FAMILY, value.rank())
            }
        }
    };
}

role_family!(
    /// Roles granted on organizations.
    OrganizationRole,
    RoleFamily::Organization
);
role_family!(
    /// Roles granted on products.
    ProductRole,
    RoleFamily::Product
);
role_family!(
    /// Roles granted on repositories.
    RepositoryRole,
    RoleFamily::Repository
);

// ============================================================================
// SECTION: Role
// ============================================================================

/// A role of exactly one family.
///
/// # Invariants
/// - No ordering is defined across variants; compare [`Role::rank`] only after
///   checking [`Role::family`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "rank", rename_all = "snake_case")]
pub enum Role {
    /// Organization family role.
    Organization(OrganizationRole),
    /// Product family role.
    Product(ProductRole),
    /// Repository family role.
    Repository(RepositoryRole),
}

impl Role {
    /// Builds the role of `family` with `rank`.
    #[must_use]
    pub const fn new(family: RoleFamily, rank: RoleRank) -> Self {
        match family {
            RoleFamily::Organization => Self::Organization(OrganizationRole::from_rank(rank)),
            RoleFamily::Product => Self::Product(ProductRole::from_rank(rank)),
            RoleFamily::Repository => Self::Repository(RepositoryRole::from_rank(rank)),
        }
    }

    /// Returns the role named `name` in the family pinned to `level`.
    ///
    /// Returns `None` for the wildcard level or an unknown name; this never
    /// fails, so persisted rows can be skipped or rejected by the caller.
    #[must_use]
    pub fn lookup(level: HierarchyLevel, name: &str) -> Option<Self> {
        let family = RoleFamily::for_level(level)?;
        let rank = RoleRank::from_name(name)?;
        Some(Self::new(family, rank))
    }

    /// Returns the family of this role.
    #[must_use]
    pub const fn family(&self) -> RoleFamily {
        match self {
            Self::Organization(_) => RoleFamily::Organization,
            Self::Product(_) => RoleFamily::Product,
            Self::Repository(_) => RoleFamily::Repository,
        }
    }

    /// Returns the rank of this role within its family.
    #[must_use]
    pub const fn rank(&self) -> RoleRank {
        match self {
            Self::Organization(role) => role.rank(),
            Self::Product(role) => role.rank(),
            Self::Repository(role) => role.rank(),
        }
    }

    /// Returns the hierarchy level the role's family is pinned to.
    #[must_use]
    pub const fn level(&self) -> HierarchyLevel {
        self.family().level()
    }

    /// Returns the persisted uppercase rank name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.rank().name()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family(), self.rank())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let Some((family, rank)) = trimmed.split_once(':') else {
            return Err(RoleError::Parse(trimmed.to_string()));
        };
        let family =
            RoleFamily::from_label(family).ok_or_else(|| RoleError::UnknownFamily(family.to_string()))?;
        let rank = RoleRank::from_label(rank).ok_or_else(|| RoleError::UnknownRank(rank.to_string()))?;
        Ok(Self::new(family, rank))
    }
}
