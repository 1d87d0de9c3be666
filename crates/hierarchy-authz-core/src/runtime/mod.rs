// crates/hierarchy-authz-core/src/runtime/mod.rs
// ============================================================================
// Module: Hierarchy Authz Runtime
// Description: Resolution engine, filters, effective roles, and services.
// Purpose: Evaluate role assignments against permission checks.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement permission resolution and the helpers built on
//! it. Every entry point resolves through [`HierarchyPermissions`] so access
//! checks, filters, and effective roles cannot disagree.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod authorizer;
pub mod effective;
pub mod filter;
pub mod resolver;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authorizer::Authorizer;
pub use authorizer::AuthorizerError;
pub use effective::EffectiveRole;
pub use effective::effective_role;
pub use filter::HierarchyFilter;
pub use resolver::HierarchyPermissions;
pub use resolver::IdsByLevel;
pub use resolver::ResolutionError;
pub use resolver::validate_assignment;
pub use store::InMemoryRoleAssignmentStore;
