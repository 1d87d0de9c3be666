// crates/hierarchy-authz-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Role Assignment Store
// Description: Durable RoleAssignmentStore backed by SQLite.
// Purpose: Persist role assignments as flat rows with fail-closed decoding.
// Dependencies: hierarchy-authz-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RoleAssignmentStore`] using `SQLite`.
//! Each row holds one user's role on one address. Addresses are stored as
//! three nullable identifier columns (all null for the wildcard) and roles as
//! the family level label plus the uppercase rank name.
//!
//! Loads rebuild both with [`HierarchyAddress::from_parts`] and
//! [`Role::lookup`]; a row that cannot be rebuilt is reported as corruption
//! rather than skipped, so a damaged grant never silently disappears.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use hierarchy_authz_core::HierarchyAddress;
use hierarchy_authz_core::HierarchyLevel;
use hierarchy_authz_core::OrganizationId;
use hierarchy_authz_core::ProductId;
use hierarchy_authz_core::RepositoryId;
use hierarchy_authz_core::Role;
use hierarchy_authz_core::RoleAssignment;
use hierarchy_authz_core::RoleAssignmentStore;
use hierarchy_authz_core::StoreError;
use hierarchy_authz_core::UserId;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Column list shared by assignment queries.
const ASSIGNMENT_COLUMNS: &str =
    "user_id, organization_id, product_id, repository_id, role_level, role_name";

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` role assignment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Returns a config for `path` with default tuning.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A stored row cannot be rebuilt into an assignment.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================//
// SECTION: Row Encoding
// ============================================================================//

/// Raw column values of one assignment row.
type RawRow = (String, Option<i64>, Option<i64>, Option<i64>, String, String);

/// Address identifier columns as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AddressColumns {
    /// Organization identifier column.
    organization_id: Option<i64>,
    /// Product identifier column.
    product_id: Option<i64>,
    /// Repository identifier column.
    repository_id: Option<i64>,
}

impl AddressColumns {
    /// Encodes an address into nullable columns.
    fn encode(address: &HierarchyAddress) -> Result<Self, SqliteStoreError> {
        Ok(Self {
            organization_id: encode_id(address.organization_id().map(OrganizationId::get))?,
            product_id: encode_id(address.product_id().map(ProductId::get))?,
            repository_id: encode_id(address.repository_id().map(RepositoryId::get))?,
        })
    }
}

/// Converts an identifier into an `SQLite` integer.
fn encode_id(id: Option<u64>) -> Result<Option<i64>, SqliteStoreError> {
    id.map(|value| {
        i64::try_from(value)
            .map_err(|_| SqliteStoreError::Invalid(format!("identifier out of range: {value}")))
    })
    .transpose()
}

/// Converts a stored integer back into an identifier.
fn decode_id(value: Option<i64>, column: &str) -> Result<Option<u64>, SqliteStoreError> {
    value
        .map(|raw| {
            u64::try_from(raw)
                .map_err(|_| SqliteStoreError::Corrupt(format!("negative {column}: {raw}")))
        })
        .transpose()
}

/// Rebuilds an assignment from raw column values.
fn decode_row(row: RawRow) -> Result<RoleAssignment, SqliteStoreError> {
    let (user_id, organization_id, product_id, repository_id, role_level, role_name) = row;
    let address = HierarchyAddress::from_parts(
        decode_id(organization_id, "organization_id")?.map(OrganizationId::new),
        decode_id(product_id, "product_id")?.map(ProductId::new),
        decode_id(repository_id, "repository_id")?.map(RepositoryId::new),
    )
    .map_err(|err| SqliteStoreError::Corrupt(format!("assignment for {user_id}: {err}")))?;
    let role = HierarchyLevel::from_label(&role_level)
        .and_then(|level| Role::lookup(level, &role_name))
        .ok_or_else(|| {
            SqliteStoreError::Corrupt(format!(
                "assignment for {user_id}: unknown role {role_level}/{role_name}"
            ))
        })?;
    Ok(RoleAssignment::new(user_id, role, address))
}

/// Reads the raw column values of one row.
fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed role assignment store.
///
/// # Invariants
/// - At most one row exists per `(user_id, address, role_level)`; writes
///   replace only the role of the same family.
#[derive(Clone)]
pub struct SqliteRoleAssignmentStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRoleAssignmentStore {
    /// Opens an `SQLite`-backed role assignment store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Loads all assignments of one user.
    fn load_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, SqliteStoreError> {
        let rows = {
            let guard = self.lock()?;
            let mut statement = guard.prepare(&format!(
                "SELECT {ASSIGNMENT_COLUMNS} FROM role_assignments WHERE user_id = ?1 ORDER BY id"
            ))?;
            let rows = statement
                .query_map(params![user_id.as_str()], read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            drop(statement);
            drop(guard);
            rows
        };
        rows.into_iter().map(decode_row).collect()
    }

    /// Returns whether any row exists.
    fn any_row(&self) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let found: Option<i64> = guard
            .query_row("SELECT 1 FROM role_assignments LIMIT 1", params![], |row| row.get(0))
            .optional()?;
        drop(guard);
        Ok(found.is_some())
    }

    /// Replaces the user's role of the same family on the assignment's address.
    fn replace(&self, assignment: &RoleAssignment) -> Result<(), SqliteStoreError> {
        let columns = AddressColumns::encode(&assignment.address)?;
        let created_at = unix_millis();
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        tx.execute(
            "DELETE FROM role_assignments WHERE user_id = ?1 AND organization_id IS ?2 AND \
             product_id IS ?3 AND repository_id IS ?4 AND role_level = ?5",
            params![
                assignment.user_id.as_str(),
                columns.organization_id,
                columns.product_id,
                columns.repository_id,
                assignment.role.level().as_str()
            ],
        )?;
        tx.execute(
            "INSERT INTO role_assignments (user_id, organization_id, product_id, repository_id, \
             role_level, role_name, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                assignment.user_id.as_str(),
                columns.organization_id,
                columns.product_id,
                columns.repository_id,
                assignment.role.level().as_str(),
                assignment.role.name(),
                created_at
            ],
        )?;
        tx.commit()?;
        drop(guard);
        Ok(())
    }

    /// Deletes the user's rows on `address`.
    fn delete(&self, user_id: &UserId, address: &HierarchyAddress) -> Result<bool, SqliteStoreError> {
        let columns = AddressColumns::encode(address)?;
        let guard = self.lock()?;
        let removed = guard.execute(
            "DELETE FROM role_assignments WHERE user_id = ?1 AND organization_id IS ?2 AND \
             product_id IS ?3 AND repository_id IS ?4",
            params![user_id.as_str(), columns.organization_id, columns.product_id, columns.repository_id],
        )?;
        drop(guard);
        Ok(removed > 0)
    }

    /// Lists users holding `role` on `address`.
    fn users_with_role(
        &self,
        role: &Role,
        address: &HierarchyAddress,
    ) -> Result<BTreeSet<UserId>, SqliteStoreError> {
        let columns = AddressColumns::encode(address)?;
        let guard = self.lock()?;
        let mut statement = guard.prepare(
            "SELECT user_id FROM role_assignments WHERE organization_id IS ?1 AND product_id IS ?2 \
             AND repository_id IS ?3 AND role_level = ?4 AND role_name = ?5",
        )?;
        let users = statement
            .query_map(
                params![
                    columns.organization_id,
                    columns.product_id,
                    columns.repository_id,
                    role.level().as_str(),
                    role.name()
                ],
                |row| row.get::<_, String>(0),
            )?
            .map(|user| user.map(UserId::new))
            .collect::<Result<BTreeSet<_>, _>>()?;
        drop(statement);
        drop(guard);
        Ok(users)
    }
}

impl RoleAssignmentStore for SqliteRoleAssignmentStore {
    fn list_assignments_for_user(&self, user_id: &UserId) -> Result<Vec<RoleAssignment>, StoreError> {
        self.load_for_user(user_id).map_err(StoreError::from)
    }

    fn has_any_assignment(&self) -> Result<bool, StoreError> {
        self.any_row().map_err(StoreError::from)
    }

    fn create_assignment(&self, assignment: &RoleAssignment) -> Result<(), StoreError> {
        self.replace(assignment).map_err(StoreError::from)
    }

    fn remove_assignment(&self, user_id: &UserId, address: &HierarchyAddress) -> Result<bool, StoreError> {
        self.delete(user_id, address).map_err(StoreError::from)
    }

    fn list_users_with_role(
        &self,
        role: &Role,
        address: &HierarchyAddress,
    ) -> Result<BTreeSet<UserId>, StoreError> {
        self.users_with_role(role, address).map_err(StoreError::from)
    }
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must be non-empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection.execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS role_assignments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    organization_id INTEGER,
                    product_id INTEGER,
                    repository_id INTEGER,
                    role_level TEXT NOT NULL,
                    role_name TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_role_assignments_user_id
                    ON role_assignments (user_id);
                CREATE INDEX IF NOT EXISTS idx_role_assignments_address
                    ON role_assignments (organization_id, product_id, repository_id);",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
