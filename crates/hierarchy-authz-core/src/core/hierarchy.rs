// crates/hierarchy-authz-core/src/core/hierarchy.rs
// ============================================================================
// Module: Hierarchy Addressing
// Description: Addresses for organization, product, and repository nodes.
// Purpose: Make invalid identifier combinations unrepresentable.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`HierarchyAddress`] names exactly one node of the three-level tree
//! (organization, product, repository) or the wildcard root that stands for
//! every organization. Each variant carries precisely the identifiers its
//! level requires, so a product address without an organization cannot be
//! constructed. Ancestry is a prefix relation on the identifier path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::iter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::ProductId;
use crate::core::identifiers::RepositoryId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Textual form of the wildcard address.
const WILDCARD_TEXT: &str = "*";
/// Segment label for organization identifiers.
const ORGANIZATION_SEGMENT: &str = "org";
/// Segment label for product identifiers.
const PRODUCT_SEGMENT: &str = "product";
/// Segment label for repository identifiers.
const REPOSITORY_SEGMENT: &str = "repo";

// ============================================================================
// SECTION: Hierarchy Level
// ============================================================================

/// Level of a node in the hierarchy.
///
/// # Invariants
/// - Ordering is `Wildcard < Organization < Product < Repository`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    /// Every organization; used solely for superuser grants.
    Wildcard,
    /// Organization level.
    Organization,
    /// Product level.
    Product,
    /// Repository level.
    Repository,
}

impl HierarchyLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 4] = [Self::Wildcard, Self::Organization, Self::Product, Self::Repository];

    /// Returns the stable lowercase label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wildcard => "wildcard",
            Self::Organization => "organization",
            Self::Product => "product",
            Self::Repository => "repository",
        }
    }

    /// Parses a level from its lowercase label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == label)
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while constructing hierarchy addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// An identifier was supplied without the identifiers of its parents.
    #[error("{level} identifier supplied without a {missing} identifier")]
    MissingParent {
        /// Level whose identifier was present.
        level: HierarchyLevel,
        /// Parent level whose identifier was missing.
        missing: HierarchyLevel,
    },
    /// Textual address could not be parsed.
    #[error("invalid hierarchy address: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Hierarchy Address
// ============================================================================

/// Address of one node in the hierarchy.
///
/// # Invariants
/// - A repository address carries organization, product, and repository ids.
/// - A product address carries organization and product ids.
/// - Equality is by level and identifier tuple; addresses at different levels
///   are never equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum HierarchyAddress {
    /// Wildcard root standing for every organization.
    Wildcard,
    /// An organization.
    Organization {
        /// Organization identifier.
        organization_id: OrganizationId,
    },
    /// A product inside an organization.
    Product {
        /// Owning organization identifier.
        organization_id: OrganizationId,
        /// Product identifier.
        product_id: ProductId,
    },
    /// A repository inside a product.
    Repository {
        /// Owning organization identifier.
        organization_id: OrganizationId,
        /// Owning product identifier.
        product_id: ProductId,
        /// Repository identifier.
        repository_id: RepositoryId,
    },
}

impl HierarchyAddress {
    /// Returns the address of an organization.
    #[must_use]
    pub const fn for_organization(organization_id: OrganizationId) -> Self {
        Self::Organization {
            organization_id,
        }
    }

    /// Returns the address of a product.
    #[must_use]
    pub const fn for_product(organization_id: OrganizationId, product_id: ProductId) -> Self {
        Self::Product {
            organization_id,
            product_id,
        }
    }

    /// Returns the address of a repository.
    #[must_use]
    pub const fn for_repository(
        organization_id: OrganizationId,
        product_id: ProductId,
        repository_id: RepositoryId,
    ) -> Self {
        Self::Repository {
            organization_id,
            product_id,
            repository_id,
        }
    }

    /// Rebuilds an address from optional identifiers, as stored in nullable
    /// columns. All identifiers absent yields the wildcard address.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::MissingParent`] when an identifier is present
    /// without the identifiers of its parents.
    pub const fn from_parts(
        organization_id: Option<OrganizationId>,
        product_id: Option<ProductId>,
        repository_id: Option<RepositoryId>,
    ) -> Result<Self, HierarchyError> {
        match (organization_id, product_id, repository_id) {
            (None, None, None) => Ok(Self::Wildcard),
            (Some(organization_id), None, None) => Ok(Self::for_organization(organization_id)),
            (Some(organization_id), Some(product_id), None) => {
                Ok(Self::for_product(organization_id, product_id))
            }
            (Some(organization_id), Some(product_id), Some(repository_id)) => {
                Ok(Self::for_repository(organization_id, product_id, repository_id))
            }
            (None, Some(_), _) => Err(HierarchyError::MissingParent {
                level: HierarchyLevel::Product,
                missing: HierarchyLevel::Organization,
            }),
            (_, None, Some(_)) => Err(HierarchyError::MissingParent {
                level: HierarchyLevel::Repository,
                missing: HierarchyLevel::Product,
            }),
        }
    }

    /// Returns the level of this address.
    #[must_use]
    pub const fn level(&self) -> HierarchyLevel {
        match self {
            Self::Wildcard => HierarchyLevel::Wildcard,
            Self::Organization {
                ..
            } => HierarchyLevel::Organization,
            Self::Product {
                ..
            } => HierarchyLevel::Product,
            Self::Repository {
                ..
            } => HierarchyLevel::Repository,
        }
    }

    /// Returns the address one level up. Organizations and the wildcard
    /// have no parent.
    #[must_use]
    pub const fn parent(&self) -> Option<Self> {
        match *self {
            Self::Wildcard
            | Self::Organization {
                ..
            } => None,
            Self::Product {
                organization_id,
                ..
            } => Some(Self::for_organization(organization_id)),
            Self::Repository {
                organization_id,
                product_id,
                ..
            } => Some(Self::for_product(organization_id, product_id)),
        }
    }

    /// Returns the strict ancestors of this address, nearest first. The
    /// wildcard address is never yielded.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + use<> {
        iter::successors(self.parent(), Self::parent)
    }

    /// Returns the address at `level` on the path from the root to this
    /// node, or `None` when `level` is below this node.
    #[must_use]
    pub const fn ancestor_at(&self, level: HierarchyLevel) -> Option<Self> {
        match (level, *self) {
            (HierarchyLevel::Wildcard, _) => Some(Self::Wildcard),
            (
                HierarchyLevel::Organization,
                Self::Organization {
                    organization_id,
                }
                | Self::Product {
                    organization_id,
                    ..
                }
                | Self::Repository {
                    organization_id,
                    ..
                },
            ) => Some(Self::for_organization(organization_id)),
            (
                HierarchyLevel::Product,
                Self::Product {
                    organization_id,
                    product_id,
                }
                | Self::Repository {
                    organization_id,
                    product_id,
                    ..
                },
            ) => Some(Self::for_product(organization_id, product_id)),
            (
                HierarchyLevel::Repository,
                Self::Repository {
                    ..
                },
            ) => Some(*self),
            _ => None,
        }
    }

    /// Returns true when this address is `other` or one of its ancestors.
    /// The wildcard address is an ancestor of every address.
    #[must_use]
    pub fn is_ancestor_or_self_of(&self, other: &Self) -> bool {
        other.ancestor_at(self.level()).is_some_and(|ancestor| ancestor == *self)
    }

    /// Returns true when this address is a proper ancestor of `other`.
    #[must_use]
    pub fn is_strict_ancestor_of(&self, other: &Self) -> bool {
        self != other && self.is_ancestor_or_self_of(other)
    }

    /// Returns the organization identifier, if any.
    #[must_use]
    pub const fn organization_id(&self) -> Option<OrganizationId> {
        match *self {
            Self::Wildcard => None,
            Self::Organization {
                organization_id,
            }
            | Self::Product {
                organization_id,
                ..
            }
            | Self::Repository {
                organization_id,
                ..
            } => Some(organization_id),
        }
    }

    /// Returns the product identifier, if any.
    #[must_use]
    pub const fn product_id(&self) -> Option<ProductId> {
        match *self {
            Self::Product {
                product_id,
                ..
            }
            | Self::Repository {
                product_id,
                ..
            } => Some(product_id),
            Self::Wildcard
            | Self::Organization {
                ..
            } => None,
        }
    }

    /// Returns the repository identifier, if any.
    #[must_use]
    pub const fn repository_id(&self) -> Option<RepositoryId> {
        match *self {
            Self::Repository {
                repository_id,
                ..
            } => Some(repository_id),
            _ => None,
        }
    }

    /// Returns the raw identifier of the node itself (its own level only).
    #[must_use]
    pub const fn node_id(&self) -> Option<u64> {
        match *self {
            Self::Wildcard => None,
            Self::Organization {
                organization_id,
            } => Some(organization_id.get()),
            Self::Product {
                product_id,
                ..
            } => Some(product_id.get()),
            Self::Repository {
                repository_id,
                ..
            } => Some(repository_id.get()),
        }
    }
}

impl fmt::Display for HierarchyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str(WILDCARD_TEXT),
            Self::Organization {
                organization_id,
            } => write!(f, "{ORGANIZATION_SEGMENT}:{organization_id}"),
            Self::Product {
                organization_id,
                product_id,
            } => write!(f, "{ORGANIZATION_SEGMENT}:{organization_id}/{PRODUCT_SEGMENT}:{product_id}"),
            Self::Repository {
                organization_id,
                product_id,
                repository_id,
            } => write!(
                f,
                "{ORGANIZATION_SEGMENT}:{organization_id}/{PRODUCT_SEGMENT}:{product_id}/\
                 {REPOSITORY_SEGMENT}:{repository_id}"
            ),
        }
    }
}

impl FromStr for HierarchyAddress {
    type Err = HierarchyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed == WILDCARD_TEXT {
            return Ok(Self::Wildcard);
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        let labels = [ORGANIZATION_SEGMENT, PRODUCT_SEGMENT, REPOSITORY_SEGMENT];
        if segments.is_empty() || segments.len() > labels.len() {
            return Err(HierarchyError::Parse(trimmed.to_string()));
        }
        let mut ids = [None; 3];
        for (index, segment) in segments.iter().enumerate() {
            ids[index] = Some(parse_segment(segment, labels[index], trimmed)?);
        }
        Self::from_parts(
            ids[0].map(OrganizationId::new),
            ids[1].map(ProductId::new),
            ids[2].map(RepositoryId::new),
        )
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses one `label:id` segment of a textual address.
fn parse_segment(segment: &str, label: &str, whole: &str) -> Result<u64, HierarchyError> {
    let Some((found, raw_id)) = segment.split_once(':') else {
        return Err(HierarchyError::Parse(whole.to_string()));
    };
    if found != label {
        return Err(HierarchyError::Parse(whole.to_string()));
    }
    raw_id.parse::<u64>().map_err(|_| HierarchyError::Parse(whole.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
