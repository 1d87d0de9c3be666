// crates/hierarchy-authz-migration/src/snapshot.rs
// ============================================================================
// Module: Snapshot Files
// Description: Bounded reads of JSON snapshot files.
// Purpose: Reject oversized or non-UTF-8 snapshots before parsing.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Shared file reader for directory and catalog snapshots.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum snapshot file size in bytes.
pub const MAX_SNAPSHOT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Reads a snapshot file as UTF-8 text.
pub(crate) fn read_snapshot(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    if bytes.len() > MAX_SNAPSHOT_BYTES {
        return Err(format!("snapshot {} exceeds size limit", path.display()));
    }
    String::from_utf8(bytes).map_err(|_| format!("snapshot {} must be utf-8", path.display()))
}
