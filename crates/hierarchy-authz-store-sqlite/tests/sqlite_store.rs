// crates/hierarchy-authz-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite RoleAssignmentStore behavior.
// Purpose: Ensure durable persistence, replacement, and fail-closed decoding.
// Dependencies: hierarchy-authz-store-sqlite, hierarchy-authz-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed role assignment store.
//! Exercises persistence across reopen, one-role-per-family replacement,
//! wildcard rows, schema version checks, and rows tampered with outside the
//! store. Security posture: tests model untrusted storage inputs.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::PathBuf;

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::OrganizationId;
use hierarchy_authz_core::OrganizationRole;
use hierarchy_authz_core::ProductId;
use hierarchy_authz_core::ProductRole;
use hierarchy_authz_core::RepositoryId;
use hierarchy_authz_core::RepositoryRole;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::RoleAssignment;
use hierarchy_authz_core::RoleAssignmentStore;
use hierarchy_authz_core::StoreError;
use hierarchy_authz_core::UserId;
use hierarchy_authz_store_sqlite::SqliteRoleAssignmentStore;
use hierarchy_authz_store_sqlite::SqliteStoreConfig;
use hierarchy_authz_store_sqlite::SqliteStoreError;
use hierarchy_authz_store_sqlite::SqliteStoreMode;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("authz").join("roles.sqlite")
}

fn open(path: &PathBuf) -> SqliteRoleAssignmentStore {
    SqliteRoleAssignmentStore::new(&SqliteStoreConfig::for_path(path)).expect("open store")
}

fn product() -> HierarchyAddress {
    HierarchyAddress::for_product(OrganizationId::new(1), ProductId::new(2))
}

fn repo() -> HierarchyAddress {
    HierarchyAddress::for_repository(OrganizationId::new(1), ProductId::new(2), RepositoryId::new(3))
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

#[test]
fn assignments_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    {
        let store = open(&path);
        assert!(!store.has_any_assignment().unwrap());
        store.create_assignment(&RoleAssignment::new("alice", ProductRole::Writer, product())).unwrap();
        store.create_assignment(&RoleAssignment::new("alice", RepositoryRole::Admin, repo())).unwrap();
    }
    let store = open(&path);
    assert!(store.has_any_assignment().unwrap());
    let loaded = store.list_assignments_for_user(&UserId::new("alice")).unwrap();
    assert_eq!(
        loaded,
        vec![
            RoleAssignment::new("alice", ProductRole::Writer, product()),
            RoleAssignment::new("alice", RepositoryRole::Admin, repo()),
        ]
    );
}

#[test]
fn create_replaces_role_on_same_node() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_assignment(&RoleAssignment::new("alice", ProductRole::Reader, product())).unwrap();
    store.create_assignment(&RoleAssignment::new("alice", ProductRole::Admin, product())).unwrap();

    let loaded = store.list_assignments_for_user(&UserId::new("alice")).unwrap();
    assert_eq!(loaded, vec![RoleAssignment::new("alice", ProductRole::Admin, product())]);
}

#[test]
fn roles_of_other_families_on_same_node_are_kept() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_assignment(&RoleAssignment::new("alice", ProductRole::Writer, product())).unwrap();
    store.create_assignment(&RoleAssignment::new("alice", RepositoryRole::Reader, product())).unwrap();
    store.create_assignment(&RoleAssignment::new("alice", ProductRole::Admin, product())).unwrap();

    let loaded = store.list_assignments_for_user(&UserId::new("alice")).unwrap();
    assert_eq!(
        loaded,
        vec![
            RoleAssignment::new("alice", RepositoryRole::Reader, product()),
            RoleAssignment::new("alice", ProductRole::Admin, product()),
        ]
    );

    assert!(store.remove_assignment(&UserId::new("alice"), &product()).unwrap());
    assert!(!store.has_any_assignment().unwrap());
}

#[test]
fn superuser_row_round_trips_with_null_columns() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_assignment(&RoleAssignment::superuser("root")).unwrap();
    store.create_assignment(&RoleAssignment::superuser("root")).unwrap();

    let loaded = store.list_assignments_for_user(&UserId::new("root")).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].is_superuser_marker());
}

#[test]
fn remove_and_list_users() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    for user in ["alice", "bob"] {
        store.create_assignment(&RoleAssignment::new(user, ProductRole::Writer, product())).unwrap();
    }
    store.create_assignment(&RoleAssignment::new("carol", ProductRole::Reader, product())).unwrap();

    let writers = store.list_users_with_role(&Role::Product(ProductRole::Writer), &product()).unwrap();
    assert_eq!(writers, BTreeSet::from([UserId::new("alice"), UserId::new("bob")]));

    assert!(store.remove_assignment(&UserId::new("alice"), &product()).unwrap());
    assert!(!store.remove_assignment(&UserId::new("alice"), &product()).unwrap());
    let writers = store.list_users_with_role(&Role::Product(ProductRole::Writer), &product()).unwrap();
    assert_eq!(writers, BTreeSet::from([UserId::new("bob")]));
}

#[test]
fn delete_journal_mode_is_accepted() {
    let dir = TempDir::new().unwrap();
    let mut config = SqliteStoreConfig::for_path(db_path(&dir));
    config.journal_mode = SqliteStoreMode::Delete;
    let store = SqliteRoleAssignmentStore::new(&config).unwrap();
    store
        .create_assignment(&RoleAssignment::new(
            "alice",
            OrganizationRole::Admin,
            HierarchyAddress::for_organization(OrganizationId::new(1)),
        ))
        .unwrap();
    assert!(store.has_any_assignment().unwrap());
}

// ============================================================================
// SECTION: Fail-Closed Decoding
// ============================================================================

#[test]
fn unknown_role_name_is_corruption() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let store = open(&path);
    store.create_assignment(&RoleAssignment::new("alice", ProductRole::Writer, product())).unwrap();

    let raw = Connection::open(&path).unwrap();
    raw.execute("UPDATE role_assignments SET role_name = 'OWNER'", params![]).unwrap();
    drop(raw);

    let err = store.list_assignments_for_user(&UserId::new("alice")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn orphaned_identifier_is_corruption() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let store = open(&path);
    store.create_assignment(&RoleAssignment::new("alice", RepositoryRole::Reader, repo())).unwrap();

    let raw = Connection::open(&path).unwrap();
    raw.execute("UPDATE role_assignments SET product_id = NULL", params![]).unwrap();
    drop(raw);

    let err = store.list_assignments_for_user(&UserId::new("alice")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    drop(open(&path));

    let raw = Connection::open(&path).unwrap();
    raw.execute("UPDATE store_meta SET version = 99", params![]).unwrap();
    drop(raw);

    let result = SqliteRoleAssignmentStore::new(&SqliteStoreConfig::for_path(&path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn directory_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = SqliteRoleAssignmentStore::new(&SqliteStoreConfig::for_path(dir.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn identifiers_beyond_sqlite_range_are_invalid() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    let address = HierarchyAddress::for_organization(OrganizationId::new(u64::MAX));
    let err = store.create_assignment(&RoleAssignment::new("alice", OrganizationRole::Reader, address)).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}
