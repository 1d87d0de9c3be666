// crates/hierarchy-authz-migration/tests/naming.rs
// ============================================================================
// Module: Group Naming and Snapshot Tests
// Description: Tests for group names and JSON snapshot loading.
// Purpose: Validate the naming convention and fail-closed snapshot parsing.
// Dependencies: hierarchy-authz-migration, hierarchy-authz-core, tempfile
// ============================================================================

//! ## Overview
//! Covers group name formatting and decoding with and without a prefix, and
//! the static directory and catalog snapshot loaders.

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

use std::collections::BTreeSet;

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::HierarchyLevel;
use hierarchy_authz_core::OrganizationId;
use hierarchy_authz_core::ProductId;
use hierarchy_authz_core::ProductRole;
use hierarchy_authz_core::RepositoryId;
use hierarchy_authz_core::RepositoryRole;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::UserId;
use hierarchy_authz_migration::CatalogError;
use hierarchy_authz_migration::DirectoryError;
use hierarchy_authz_migration::GroupDirectory;
use hierarchy_authz_migration::GroupKind;
use hierarchy_authz_migration::GroupNaming;
use hierarchy_authz_migration::HierarchyCatalog;
use hierarchy_authz_migration::MAX_SNAPSHOT_BYTES;
use hierarchy_authz_migration::StaticGroupDirectory;
use hierarchy_authz_migration::StaticHierarchyCatalog;

fn repo() -> HierarchyAddress {
    HierarchyAddress::for_repository(OrganizationId::new(1), ProductId::new(2), RepositoryId::new(42))
}

// ============================================================================
// SECTION: Naming
// ============================================================================

#[test]
fn group_names_use_the_node_id() {
    let naming = GroupNaming::default();
    assert_eq!(
        naming.group_name(Role::Repository(RepositoryRole::Reader), &repo()).unwrap(),
        "REPOSITORY_42_READERS"
    );
    assert_eq!(naming.superuser_group_name(), "SUPERUSERS");

    let prefixed = GroupNaming::new("tenant_", "ROOTS");
    assert_eq!(
        prefixed.group_name(Role::Repository(RepositoryRole::Admin), &repo()).unwrap(),
        "tenant_REPOSITORY_42_ADMINS"
    );
    assert_eq!(prefixed.superuser_group_name(), "tenant_ROOTS");
}

#[test]
fn group_name_requires_matching_family() {
    let naming = GroupNaming::default();
    assert_eq!(naming.group_name(Role::Product(ProductRole::Writer), &repo()), None);
    assert_eq!(naming.group_name(Role::Product(ProductRole::Writer), &HierarchyAddress::Wildcard), None);
}

#[test]
fn names_parse_back() {
    let naming = GroupNaming::new("tenant_", "SUPERUSERS");
    let name = naming.group_name(Role::Repository(RepositoryRole::Writer), &repo()).unwrap();
    assert_eq!(
        naming.parse(&name),
        Some(GroupKind::Role {
            role: Role::Repository(RepositoryRole::Writer),
            level: HierarchyLevel::Repository,
            node_id: 42,
        })
    );
    assert_eq!(naming.parse("tenant_SUPERUSERS"), Some(GroupKind::Superuser));
}

#[test]
fn foreign_names_do_not_parse() {
    let naming = GroupNaming::new("tenant_", "SUPERUSERS");
    for name in [
        "REPOSITORY_42_READERS",
        "tenant_TEAM_1_READERS",
        "tenant_PRODUCT_x_READERS",
        "tenant_PRODUCT_1_OWNERS",
        "tenant_PRODUCT",
        "SUPERUSERS",
    ] {
        assert_eq!(naming.parse(name), None, "parsed {name}");
    }
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

#[test]
fn directory_snapshot_loads_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groups.json");
    std::fs::write(&path, r#"{"PRODUCT_2_WRITERS": ["bob", "alice", "bob"]}"#).unwrap();

    let directory = StaticGroupDirectory::load(&path).unwrap();
    assert_eq!(directory.group_count(), 1);
    assert_eq!(
        directory.group_members("PRODUCT_2_WRITERS").unwrap(),
        BTreeSet::from([UserId::new("alice"), UserId::new("bob")])
    );
    assert_eq!(
        directory.group_members("PRODUCT_2_ADMINS").unwrap_err(),
        DirectoryError::UnknownGroup("PRODUCT_2_ADMINS".to_string())
    );
}

#[test]
fn directory_snapshot_failures_are_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let missing = StaticGroupDirectory::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(missing, DirectoryError::Unavailable(_)));

    let malformed = StaticGroupDirectory::from_json(r#"{"G": "alice"}"#).unwrap_err();
    assert!(matches!(malformed, DirectoryError::Unavailable(_)));

    let oversized = dir.path().join("big.json");
    std::fs::write(&oversized, vec![b' '; MAX_SNAPSHOT_BYTES + 1]).unwrap();
    assert!(matches!(StaticGroupDirectory::load(&oversized), Err(DirectoryError::Unavailable(_))));
}

#[test]
fn catalog_snapshot_parses_addresses_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"["org:1", "org:1/product:2", "org:1/product:2/repo:42"]"#).unwrap();

    let catalog = StaticHierarchyCatalog::load(&path).unwrap();
    let addresses = catalog.list_addresses().unwrap();
    assert_eq!(addresses.len(), 3);
    assert_eq!(addresses[2], repo());
}

#[test]
fn catalog_rejects_wildcard_and_garbage() {
    assert!(matches!(StaticHierarchyCatalog::from_json(r#"["*"]"#), Err(CatalogError::Invalid(_))));
    assert!(matches!(StaticHierarchyCatalog::from_json(r#"["team:1"]"#), Err(CatalogError::Invalid(_))));
    assert!(matches!(StaticHierarchyCatalog::from_json("{}"), Err(CatalogError::Invalid(_))));
}
