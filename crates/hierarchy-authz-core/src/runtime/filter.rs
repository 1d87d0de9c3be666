// crates/hierarchy-authz-core/src/runtime/filter.rs
// ============================================================================
// Module: Hierarchy Filter
// Description: Listing filters derived from resolved permissions.
// Purpose: Give query layers a two-part include set for visible nodes.
// Dependencies: crate::core, crate::runtime::resolver, serde
// ============================================================================

//! ## Overview
//! A [`HierarchyFilter`] combines transitive includes (an address and all of
//! its descendants) with non-transitive includes (exactly the address). An
//! optional `contained_in` address narrows the filter to one subtree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::HierarchyAddress;
use crate::runtime::resolver::HierarchyPermissions;
use crate::runtime::resolver::IdsByLevel;

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Visible-node filter for listing queries.
///
/// # Invariants
/// - `is_wildcard` is set only for superusers without a `contained_in` bound.
/// - Levels never map to empty lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyFilter {
    /// Addresses matching themselves and every descendant.
    pub transitive_includes: IdsByLevel,
    /// Addresses matching only themselves.
    pub non_transitive_includes: IdsByLevel,
    /// Whether every address matches.
    pub is_wildcard: bool,
}

impl HierarchyFilter {
    /// Builds a filter from resolved permissions, optionally restricted to
    /// the subtree rooted at `contained_in`.
    #[must_use]
    pub fn build(permissions: &HierarchyPermissions, contained_in: Option<&HierarchyAddress>) -> Self {
        let includes = permissions.includes();
        let transitive_includes = contained_in
            .and_then(|bound| covered_bound(&includes, bound))
            .unwrap_or_else(|| restrict_to(includes, contained_in));
        Self {
            transitive_includes,
            non_transitive_includes: restrict_to(permissions.implicit_includes(), contained_in),
            is_wildcard: permissions.is_superuser() && contained_in.is_none(),
        }
    }

    /// Returns true when `address` passes the filter.
    #[must_use]
    pub fn matches(&self, address: &HierarchyAddress) -> bool {
        if self.is_wildcard {
            return true;
        }
        let transitive = self
            .transitive_includes
            .values()
            .flatten()
            .any(|include| include.is_ancestor_or_self_of(address));
        transitive
            || self
                .non_transitive_includes
                .get(&address.level())
                .is_some_and(|includes| includes.contains(address))
    }

    /// Returns true when nothing can match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_wildcard && self.transitive_includes.is_empty() && self.non_transitive_includes.is_empty()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns `{level(bound): [bound]}` when a strictly higher include covers
/// the bound.
fn covered_bound(includes: &IdsByLevel, bound: &HierarchyAddress) -> Option<IdsByLevel> {
    let covered = includes
        .iter()
        .filter(|(level, _)| **level < bound.level())
        .flat_map(|(_, addresses)| addresses)
        .any(|address| address.is_ancestor_or_self_of(bound));
    covered.then(|| IdsByLevel::from([(bound.level(), vec![*bound])]))
}

/// Keeps only addresses inside `bound`, dropping emptied levels.
fn restrict_to(ids: IdsByLevel, bound: Option<&HierarchyAddress>) -> IdsByLevel {
    let Some(bound) = bound else {
        return ids;
    };
    ids.into_iter()
        .filter_map(|(level, addresses)| {
            let kept: Vec<HierarchyAddress> =
                addresses.into_iter().filter(|address| bound.is_ancestor_or_self_of(address)).collect();
            (!kept.is_empty()).then_some((level, kept))
        })
        .collect()
}
