//! Config load validation tests for hierarchy-authz-config.
// crates/hierarchy-authz-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, syntax).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use hierarchy_authz_config::AuditSinkKind;
use hierarchy_authz_config::ConfigError;
use hierarchy_authz_config::HierarchyAuthzConfig;
use hierarchy_authz_migration::GroupNaming;
use hierarchy_authz_store_sqlite::SqliteStoreConfig;
use hierarchy_authz_store_sqlite::SqliteStoreMode;
use hierarchy_authz_store_sqlite::SqliteSyncMode;
use tempfile::NamedTempFile;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<HierarchyAuthzConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_reads_minimal_file_with_defaults() -> TestResult {
    let file = write_config(common::MINIMAL_TOML.as_bytes())?;
    let config = HierarchyAuthzConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.store.busy_timeout_ms != 5_000
        || config.store.journal_mode != SqliteStoreMode::Wal
        || config.store.sync_mode != SqliteSyncMode::Full
    {
        return Err("unexpected store defaults".to_string());
    }
    if config.migration.group_prefix.is_empty() && config.migration.superuser_group == "SUPERUSERS" {
        Ok(())
    } else {
        Err("unexpected migration defaults".to_string())
    }
}

#[test]
fn defaults_match_store_and_migration_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let sqlite = config.sqlite_config();
    let store_default = SqliteStoreConfig::for_path(config.store.path.clone());
    if sqlite.busy_timeout_ms != store_default.busy_timeout_ms
        || sqlite.journal_mode != store_default.journal_mode
        || sqlite.sync_mode != store_default.sync_mode
    {
        return Err("config store defaults drifted from the sqlite store".to_string());
    }
    if config.migration.superuser_group == GroupNaming::default().superuser_group_name() {
        Ok(())
    } else {
        Err("config superuser group drifted from the migration default".to_string())
    }
}

#[test]
fn load_reads_full_file() -> TestResult {
    let file = write_config(
        br#"
[store]
path = "/var/lib/authz/roles.sqlite"
busy_timeout_ms = 250
journal_mode = "delete"
sync_mode = "normal"

[migration]
group_prefix = "namespace_"
superuser_group = "ROOTS"
directory_snapshot = "groups.json"
catalog_snapshot = "catalog.json"

[audit]
sink = "file"
path = "migration.jsonl"
"#,
    )?;
    let config = HierarchyAuthzConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let sqlite = config.sqlite_config();
    if sqlite.busy_timeout_ms != 250 || sqlite.journal_mode != SqliteStoreMode::Delete {
        return Err("store section not applied".to_string());
    }
    if config.audit.sink != AuditSinkKind::File || config.migration.group_prefix != "namespace_" {
        return Err("migration or audit section not applied".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let result = HierarchyAuthzConfig::load(Some(&dir.path().join("absent.toml")));
    if matches!(result, Err(ConfigError::Io(_))) {
        Ok(())
    } else {
        Err("expected io error".to_string())
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(HierarchyAuthzConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(HierarchyAuthzConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(HierarchyAuthzConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(HierarchyAuthzConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_unknown_keys() -> TestResult {
    let file = write_config(b"[store]\npath = \"roles.sqlite\"\ncache = true\n")?;
    assert_invalid(HierarchyAuthzConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_missing_store_section() -> TestResult {
    let file = write_config(b"[audit]\nsink = \"none\"\n")?;
    assert_invalid(HierarchyAuthzConfig::load(Some(file.path())), "config parse error")
}
