// crates/hierarchy-authz-migration/src/catalog.rs
// ============================================================================
// Module: Hierarchy Catalog
// Description: Enumeration of existing organizations, products, and repositories.
// Purpose: Tell the migration which nodes may have directory groups.
// Dependencies: hierarchy-authz-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The migration walks every node of the tree and looks up one directory
//! group per rank. [`HierarchyCatalog`] supplies those nodes; the
//! [`StaticHierarchyCatalog`] reads them from a JSON array of address strings
//! such as `["org:1", "org:1/product:2"]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use hierarchy_authz_core::HierarchyAddress;
use thiserror::Error;

use crate::snapshot::read_snapshot;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures reported by a hierarchy catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog could not be read.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    /// The catalog contents are malformed.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Interface
// ============================================================================

/// Source of existing hierarchy nodes.
pub trait HierarchyCatalog {
    /// Lists nodes in the order they should be migrated.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the nodes cannot be listed.
    fn list_addresses(&self) -> Result<Vec<HierarchyAddress>, CatalogError>;
}

// ============================================================================
// SECTION: Static Catalog
// ============================================================================

/// Catalog backed by a fixed list of nodes.
///
/// # Invariants
/// - Never contains [`HierarchyAddress::Wildcard`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHierarchyCatalog {
    /// Nodes in migration order.
    addresses: Vec<HierarchyAddress>,
}

impl StaticHierarchyCatalog {
    /// Creates a catalog from nodes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] when the wildcard is listed.
    pub fn new(addresses: Vec<HierarchyAddress>) -> Result<Self, CatalogError> {
        if addresses.contains(&HierarchyAddress::Wildcard) {
            return Err(CatalogError::Invalid("wildcard is not a catalog node".to_string()));
        }
        Ok(Self {
            addresses,
        })
    }

    /// Loads a catalog from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the file cannot be read and
    /// [`CatalogError::Invalid`] when its contents are malformed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = read_snapshot(path).map_err(CatalogError::Unavailable)?;
        Self::from_json(&content)
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] when the JSON or an address is malformed.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let raw: Vec<String> = serde_json::from_str(content)
            .map_err(|err| CatalogError::Invalid(format!("invalid catalog snapshot: {err}")))?;
        let addresses = raw
            .iter()
            .map(|text| {
                text.parse::<HierarchyAddress>()
                    .map_err(|err| CatalogError::Invalid(format!("{text}: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(addresses)
    }
}

impl HierarchyCatalog for StaticHierarchyCatalog {
    fn list_addresses(&self) -> Result<Vec<HierarchyAddress>, CatalogError> {
        Ok(self.addresses.clone())
    }
}
