// crates/hierarchy-authz-core/src/lib.rs
// ============================================================================
// Module: Hierarchy Authz Core Library
// Description: Public API surface for hierarchical role resolution.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Hierarchy authz core decides whether a user holds a permission on a node
//! of the organization / product / repository tree, and which nodes the user
//! may see when listing. Resolution is pure and synchronous; storage is
//! reached only through the [`RoleAssignmentStore`] interface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use interfaces::RoleAssignmentStore;
pub use interfaces::StoreError;
pub use runtime::Authorizer;
pub use runtime::AuthorizerError;
pub use runtime::EffectiveRole;
pub use runtime::HierarchyFilter;
pub use runtime::HierarchyPermissions;
pub use runtime::IdsByLevel;
pub use runtime::InMemoryRoleAssignmentStore;
pub use runtime::ResolutionError;
pub use runtime::effective_role;
pub use runtime::validate_assignment;
