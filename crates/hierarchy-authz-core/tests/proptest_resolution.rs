// crates/hierarchy-authz-core/tests/proptest_resolution.rs
// ============================================================================
// Module: Resolution Property-Based Tests
// Description: Property tests for permission checks and the resolver.
// Purpose: Check algebraic invariants across generated assignment sets.
// ============================================================================

//! Property-based tests for family isolation, threshold monotonicity,
//! relation-only access, dominance reduction, and the superuser override.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::HierarchyPermissions;
use hierarchy_authz_core::OrganizationId;
use hierarchy_authz_core::PermissionCheck;
use hierarchy_authz_core::ProductId;
use hierarchy_authz_core::RepositoryId;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::RoleAssignment;
use hierarchy_authz_core::RoleFamily;
use hierarchy_authz_core::RoleRank;
use proptest::prelude::*;

fn rank_strategy() -> impl Strategy<Value = RoleRank> {
    prop_oneof![Just(RoleRank::Reader), Just(RoleRank::Writer), Just(RoleRank::Admin)]
}

fn family_strategy() -> impl Strategy<Value = RoleFamily> {
    prop_oneof![
        Just(RoleFamily::Organization),
        Just(RoleFamily::Product),
        Just(RoleFamily::Repository)
    ]
}

fn role_strategy() -> impl Strategy<Value = Role> {
    (family_strategy(), rank_strategy()).prop_map(|(family, rank)| Role::new(family, rank))
}

/// Addresses over a deliberately small id space so relations are common.
fn address_strategy() -> impl Strategy<Value = HierarchyAddress> {
    (0_u8 .. 3, 1_u64 .. 3, 1_u64 .. 3, 1_u64 .. 3).prop_map(|(depth, org, product, repo)| {
        let org = OrganizationId::new(org);
        let product = ProductId::new(product);
        match depth {
            0 => HierarchyAddress::for_organization(org),
            1 => HierarchyAddress::for_product(org, product),
            _ => HierarchyAddress::for_repository(org, product, RepositoryId::new(repo)),
        }
    })
}

/// Assignments whose role family is pinned at or below the address level.
fn assignment_strategy() -> impl Strategy<Value = RoleAssignment> {
    (address_strategy(), role_strategy()).prop_map(|(address, role)| {
        let role = if role.level() < address.level() {
            Role::new(RoleFamily::Repository, role.rank())
        } else {
            role
        };
        RoleAssignment::new("user", role, address)
    })
}

fn related(a: &HierarchyAddress, b: &HierarchyAddress) -> bool {
    a.is_ancestor_or_self_of(b) || b.is_ancestor_or_self_of(a)
}

proptest! {
    #[test]
    fn checks_never_match_other_families(check_role in role_strategy(), role in role_strategy()) {
        let check = PermissionCheck::for_role(check_role);
        if role.family() != check_role.family() {
            prop_assert!(!check.allows(&role));
        }
    }

    #[test]
    fn checks_are_monotonic_in_rank(check_role in role_strategy(), low in rank_strategy(), high in rank_strategy()) {
        let check = PermissionCheck::for_role(check_role);
        let family = check_role.family();
        if low <= high && check.allows(&Role::new(family, low)) {
            prop_assert!(check.allows(&Role::new(family, high)));
        }
    }

    #[test]
    fn access_requires_a_related_satisfied_root(
        assignments in prop::collection::vec(assignment_strategy(), 0 .. 8),
        check_role in role_strategy(),
        target in address_strategy(),
    ) {
        let check = PermissionCheck::for_role(check_role);
        let permissions = HierarchyPermissions::new(&assignments, check).unwrap();
        let expected = assignments
            .iter()
            .any(|assignment| check.allows(&assignment.role) && related(&assignment.address, &target));
        prop_assert_eq!(permissions.has_permission(&target), expected);
    }

    #[test]
    fn includes_are_dominant_and_cover_every_root(
        assignments in prop::collection::vec(assignment_strategy(), 0 .. 8),
        check_role in role_strategy(),
    ) {
        let permissions = HierarchyPermissions::new(&assignments, PermissionCheck::for_role(check_role)).unwrap();
        let includes: Vec<HierarchyAddress> = permissions.includes().into_values().flatten().collect();
        for include in &includes {
            prop_assert!(!includes.iter().any(|other| other.is_strict_ancestor_of(include)));
        }
        for root in permissions.satisfied_roots() {
            prop_assert!(includes.iter().any(|include| include.is_ancestor_or_self_of(root)));
        }
    }

    #[test]
    fn implicit_includes_are_unique_and_disjoint(
        assignments in prop::collection::vec(assignment_strategy(), 0 .. 8),
        check_role in role_strategy(),
    ) {
        let permissions = HierarchyPermissions::new(&assignments, PermissionCheck::for_role(check_role)).unwrap();
        let implicit: Vec<HierarchyAddress> = permissions.implicit_includes().into_values().flatten().collect();
        let unique: BTreeSet<HierarchyAddress> = implicit.iter().copied().collect();
        prop_assert_eq!(unique.len(), implicit.len());
        for address in &implicit {
            prop_assert!(!permissions.satisfied_roots().contains(address));
            prop_assert!(permissions.has_permission(address));
        }
    }

    #[test]
    fn superuser_grant_overrides_everything(
        assignments in prop::collection::vec(assignment_strategy(), 0 .. 8),
        check_role in role_strategy(),
        target in address_strategy(),
    ) {
        let mut with_marker = assignments;
        with_marker.push(RoleAssignment::superuser("user"));
        let permissions = HierarchyPermissions::new(&with_marker, PermissionCheck::for_role(check_role)).unwrap();
        prop_assert!(permissions.is_superuser());
        prop_assert!(permissions.has_permission(&target));
        prop_assert!(permissions.implicit_includes().is_empty());
        let includes: Vec<HierarchyAddress> = permissions.includes().into_values().flatten().collect();
        prop_assert_eq!(includes, vec![HierarchyAddress::Wildcard]);
    }
}
