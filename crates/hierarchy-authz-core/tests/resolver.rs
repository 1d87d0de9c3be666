// crates/hierarchy-authz-core/tests/resolver.rs
// ============================================================================
// Module: Hierarchy Permission Resolver Tests
// Description: Scenario tests for grant inheritance, dominance, and visibility.
// Purpose: Pin down the access and include semantics of the resolver.
// Dependencies: hierarchy-authz-core
// ============================================================================
//! ## Overview
//! Exercises downward inheritance, upward implication, widening, the
//! non-restriction rule, dominance reduction, implicit include dedup, the
//! superuser override, and construction-time validation.
//!
//! Security posture: unrelated nodes must always be denied.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::HierarchyLevel;
use hierarchy_authz_core::HierarchyPermissions;
use hierarchy_authz_core::OrganizationId;
use hierarchy_authz_core::OrganizationPermission;
use hierarchy_authz_core::OrganizationRole;
use hierarchy_authz_core::PermissionCheck;
use hierarchy_authz_core::ProductId;
use hierarchy_authz_core::ProductPermission;
use hierarchy_authz_core::ProductRole;
use hierarchy_authz_core::RepositoryId;
use hierarchy_authz_core::RepositoryPermission;
use hierarchy_authz_core::RepositoryRole;
use hierarchy_authz_core::ResolutionError;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::RoleAssignment;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const USER: &str = "alice";

fn org(id: u64) -> HierarchyAddress {
    HierarchyAddress::for_organization(OrganizationId::new(id))
}

fn product(org_id: u64, id: u64) -> HierarchyAddress {
    HierarchyAddress::for_product(OrganizationId::new(org_id), ProductId::new(id))
}

fn repo(org_id: u64, product_id: u64, id: u64) -> HierarchyAddress {
    HierarchyAddress::for_repository(
        OrganizationId::new(org_id),
        ProductId::new(product_id),
        RepositoryId::new(id),
    )
}

fn grant(address: HierarchyAddress, role: impl Into<Role>) -> RoleAssignment {
    RoleAssignment::new(USER, role, address)
}

fn repo_write() -> PermissionCheck {
    PermissionCheck::for_permissions(&[RepositoryPermission::Write])
}

fn resolve(assignments: &[RoleAssignment], check: PermissionCheck) -> HierarchyPermissions {
    HierarchyPermissions::new(assignments, check).expect("valid assignments")
}

// ============================================================================
// SECTION: Access
// ============================================================================

#[test]
fn worked_example_matches_expected_answers() {
    let o = org(1);
    let r1 = repo(1, 10, 100);
    let r2 = repo(1, 10, 101);
    let r3 = repo(2, 20, 200);
    let permissions = resolve(
        &[grant(o, RepositoryRole::Writer), grant(r1, RepositoryRole::Reader)],
        repo_write(),
    );

    assert!(permissions.has_permission(&r1));
    assert!(permissions.has_permission(&r2));
    assert!(!permissions.has_permission(&r3));
    assert_eq!(permissions.includes(), BTreeMap::from([(HierarchyLevel::Organization, vec![o])]));
    assert!(permissions.implicit_includes().is_empty());
    assert!(!permissions.is_superuser());
}

#[test]
fn grant_on_repository_only_covers_repository_and_ancestors() {
    let target = repo(1, 10, 100);
    let check = PermissionCheck::for_permissions(&[RepositoryPermission::Read]);
    let permissions = resolve(&[grant(target, RepositoryRole::Reader)], check);

    assert!(permissions.has_permission(&target));
    assert!(permissions.has_permission(&product(1, 10)));
    assert!(permissions.has_permission(&org(1)));
    assert!(!permissions.has_permission(&repo(1, 10, 101)));
    assert!(!permissions.has_permission(&product(1, 11)));
    assert!(!permissions.has_permission(&org(2)));
}

#[test]
fn insufficient_grant_is_denied() {
    let target = repo(1, 10, 100);
    let permissions = resolve(&[grant(target, RepositoryRole::Reader)], repo_write());
    assert!(!permissions.has_permission(&target));
    assert!(permissions.includes().is_empty());
}

#[test]
fn product_grant_inherits_to_repositories() {
    let permissions = resolve(&[grant(product(1, 10), RepositoryRole::Writer)], repo_write());
    assert!(permissions.has_permission(&repo(1, 10, 100)));
    assert!(permissions.has_permission(&repo(1, 10, 101)));
    assert!(!permissions.has_permission(&repo(1, 11, 102)));
}

#[test]
fn deeper_sufficient_grant_widens_inherited_access() {
    let d = repo(1, 10, 100);
    let permissions =
        resolve(&[grant(org(1), RepositoryRole::Reader), grant(d, RepositoryRole::Writer)], repo_write());

    assert!(permissions.has_permission(&d));
    assert!(!permissions.has_permission(&repo(1, 10, 101)));
    assert_eq!(permissions.includes(), BTreeMap::from([(HierarchyLevel::Repository, vec![d])]));
}

#[test]
fn deeper_insufficient_grant_never_restricts() {
    let d = repo(1, 10, 100);
    let permissions =
        resolve(&[grant(org(1), RepositoryRole::Admin), grant(d, RepositoryRole::Reader)], repo_write());
    assert!(permissions.has_permission(&d));
}

#[test]
fn wildcard_target_requires_superuser() {
    let check = PermissionCheck::for_permissions(&[OrganizationPermission::Read]);
    let permissions = resolve(&[grant(org(1), OrganizationRole::Admin)], check);
    assert!(!permissions.has_permission(&HierarchyAddress::Wildcard));
}

#[test]
fn empty_assignments_deny_everything() {
    let permissions = resolve(&[], repo_write());
    assert!(!permissions.has_permission(&org(1)));
    assert!(permissions.includes().is_empty());
    assert!(permissions.implicit_includes().is_empty());
}

// ============================================================================
// SECTION: Includes
// ============================================================================

#[test]
fn dominated_roots_are_not_included() {
    let permissions = resolve(
        &[
            grant(product(1, 10), RepositoryRole::Writer),
            grant(repo(1, 10, 100), RepositoryRole::Admin),
            grant(repo(2, 20, 200), RepositoryRole::Writer),
        ],
        repo_write(),
    );

    let includes = permissions.includes();
    assert_eq!(includes.get(&HierarchyLevel::Product), Some(&vec![product(1, 10)]));
    assert_eq!(includes.get(&HierarchyLevel::Repository), Some(&vec![repo(2, 20, 200)]));
    assert_eq!(permissions.satisfied_roots().len(), 3);
    assert_eq!(permissions.dominant_roots().len(), 2);
}

#[test]
fn sibling_roots_share_one_implicit_parent() {
    let permissions = resolve(
        &[grant(repo(1, 10, 100), RepositoryRole::Reader), grant(repo(1, 10, 101), RepositoryRole::Reader)],
        PermissionCheck::for_permissions(&[RepositoryPermission::ReadRuns]),
    );

    let implicit = permissions.implicit_includes();
    assert_eq!(implicit.get(&HierarchyLevel::Product), Some(&vec![product(1, 10)]));
    assert_eq!(implicit.get(&HierarchyLevel::Organization), Some(&vec![org(1)]));
    assert!(!implicit.contains_key(&HierarchyLevel::Repository));
}

#[test]
fn non_dominant_roots_add_no_implicit_includes() {
    let permissions = resolve(
        &[grant(product(1, 10), RepositoryRole::Reader), grant(repo(1, 10, 100), RepositoryRole::Reader)],
        PermissionCheck::for_permissions(&[RepositoryPermission::Read]),
    );

    let implicit = permissions.implicit_includes();
    assert_eq!(implicit, BTreeMap::from([(HierarchyLevel::Organization, vec![org(1)])]));
}

#[test]
fn duplicate_assignments_collapse() {
    let target = repo(1, 10, 100);
    let permissions =
        resolve(&[grant(target, RepositoryRole::Writer), grant(target, RepositoryRole::Admin)], repo_write());
    assert_eq!(permissions.includes().get(&HierarchyLevel::Repository), Some(&vec![target]));
}

// ============================================================================
// SECTION: Superuser
// ============================================================================

#[test]
fn superuser_overrides_every_query() {
    let permissions = resolve(
        &[RoleAssignment::superuser(USER), grant(org(1), OrganizationRole::Reader)],
        PermissionCheck::for_permissions(&[ProductPermission::Delete]),
    );

    assert!(permissions.is_superuser());
    assert!(permissions.has_permission(&repo(9, 9, 9)));
    assert!(permissions.has_permission(&HierarchyAddress::Wildcard));
    assert_eq!(
        permissions.includes(),
        BTreeMap::from([(HierarchyLevel::Wildcard, vec![HierarchyAddress::Wildcard])])
    );
    assert!(permissions.implicit_includes().is_empty());
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn non_admin_wildcard_role_is_rejected() {
    let err = HierarchyPermissions::new(
        &[grant(HierarchyAddress::Wildcard, OrganizationRole::Writer)],
        repo_write(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ResolutionError::WildcardRole {
            role: Role::Organization(OrganizationRole::Writer),
        }
    );
}

#[test]
fn role_below_family_level_is_rejected() {
    let err =
        HierarchyPermissions::new(&[grant(repo(1, 10, 100), ProductRole::Admin)], repo_write()).unwrap_err();
    assert!(matches!(err, ResolutionError::BelowFamilyLevel { .. }));
}

#[test]
fn repository_role_on_organization_is_accepted() {
    assert!(HierarchyPermissions::new(&[grant(org(1), RepositoryRole::Reader)], repo_write()).is_ok());
}
