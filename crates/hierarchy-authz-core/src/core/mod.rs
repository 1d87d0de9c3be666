// crates/hierarchy-authz-core/src/core/mod.rs
// ============================================================================
// Module: Hierarchy Authz Core Types
// Description: Value types for addresses, roles, permissions, and assignments.
// Purpose: Group the pure data model consumed by the resolver and stores.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Pure value types. Nothing here performs I/O or holds mutable state.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod assignment;
pub mod hierarchy;
pub mod identifiers;
pub mod permissions;
pub mod roles;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assignment::RoleAssignment;
pub use assignment::SUPERUSER_ROLE;
pub use hierarchy::HierarchyAddress;
pub use hierarchy::HierarchyError;
pub use hierarchy::HierarchyLevel;
pub use identifiers::OrganizationId;
pub use identifiers::ProductId;
pub use identifiers::RepositoryId;
pub use identifiers::UserId;
pub use permissions::AnyPermission;
pub use permissions::OrganizationPermission;
pub use permissions::Permission;
pub use permissions::PermissionCheck;
pub use permissions::PermissionError;
pub use permissions::ProductPermission;
pub use permissions::RepositoryPermission;
pub use roles::OrganizationRole;
pub use roles::ProductRole;
pub use roles::RepositoryRole;
pub use roles::Role;
pub use roles::RoleError;
pub use roles::RoleFamily;
pub use roles::RoleRank;
