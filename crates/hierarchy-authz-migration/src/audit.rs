// crates/hierarchy-authz-migration/src/audit.rs
// ============================================================================
// Module: Migration Audit Logging
// Description: Structured audit events for the role migration.
// Purpose: Emit JSON-line records of migrated and skipped groups.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit event payloads and sinks for the migration job. Every event is one
//! JSON object per line carrying an `event` label and a millisecond
//! timestamp. Sinks never fail the migration: write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Migration audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Directory group name when the event concerns one group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Role granted by the group, as `family:rank`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Target node in text form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Number of members written for the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<usize>,
    /// Failure description for skipped groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Totals reported on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<MigrationTotals>,
}

/// Counters reported by `migration_completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationTotals {
    /// Groups whose membership was read and written.
    pub groups_processed: usize,
    /// Groups skipped after a directory failure.
    pub groups_skipped: usize,
    /// Assignment rows written.
    pub assignments_created: usize,
}

impl MigrationAuditEvent {
    /// Creates an event with only the label and timestamp set.
    #[must_use]
    pub fn new(event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            group: None,
            role: None,
            address: None,
            members: None,
            reason: None,
            totals: None,
        }
    }

    /// The store already holds assignments; nothing was done.
    #[must_use]
    pub fn not_applicable() -> Self {
        Self::new("migration_not_applicable")
    }

    /// The store was empty and the migration began.
    #[must_use]
    pub fn started() -> Self {
        Self::new("migration_started")
    }

    /// A group's members were written as assignments.
    #[must_use]
    pub fn group_migrated(group: &str, role: String, address: String, members: usize) -> Self {
        Self {
            group: Some(group.to_string()),
            role: Some(role),
            address: Some(address),
            members: Some(members),
            ..Self::new("migration_group_migrated")
        }
    }

    /// A group could not be read and was skipped.
    #[must_use]
    pub fn group_skipped(group: &str, reason: String) -> Self {
        Self {
            group: Some(group.to_string()),
            reason: Some(reason),
            ..Self::new("migration_group_skipped")
        }
    }

    /// The migration finished.
    #[must_use]
    pub fn completed(totals: MigrationTotals) -> Self {
        Self {
            totals: Some(totals),
            ..Self::new("migration_completed")
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for migration events.
pub trait MigrationAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &MigrationAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrMigrationAuditSink;

impl MigrationAuditSink for StderrMigrationAuditSink {
    fn record(&self, event: &MigrationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileMigrationAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileMigrationAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl MigrationAuditSink for FileMigrationAuditSink {
    fn record(&self, event: &MigrationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopMigrationAuditSink;

impl MigrationAuditSink for NoopMigrationAuditSink {
    fn record(&self, _event: &MigrationAuditEvent) {}
}
