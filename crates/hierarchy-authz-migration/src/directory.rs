// crates/hierarchy-authz-migration/src/directory.rs
// ============================================================================
// Module: Group Directory
// Description: Read-only view of an external group directory.
// Purpose: Resolve group names to member user identifiers.
// Dependencies: hierarchy-authz-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The migration reads group membership through [`GroupDirectory`]. A
//! [`StaticGroupDirectory`] serves memberships from a JSON snapshot of the
//! form `{"GROUP_NAME": ["user", ...]}`, which is how exports from an
//! external identity provider are fed to the job.
//! Security posture: snapshot files are untrusted input and size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use hierarchy_authz_core::UserId;
use thiserror::Error;

use crate::snapshot::read_snapshot;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures reported by a group directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The group does not exist in the directory.
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    /// The directory could not be read.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Interface
// ============================================================================

/// Source of group memberships.
pub trait GroupDirectory {
    /// Returns the members of `group`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the group is unknown or unreadable.
    fn group_members(&self, group: &str) -> Result<BTreeSet<UserId>, DirectoryError>;
}

// ============================================================================
// SECTION: Static Directory
// ============================================================================

/// Group directory backed by an in-memory membership map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticGroupDirectory {
    /// Members keyed by group name.
    groups: BTreeMap<String, BTreeSet<UserId>>,
}

impl StaticGroupDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `members` to `group`, creating the group if needed.
    #[must_use]
    pub fn with_group<I, U>(mut self, group: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        self.groups.entry(group.into()).or_default().extend(members.into_iter().map(Into::into));
        self
    }

    /// Loads a directory from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the file cannot be read,
    /// exceeds the size limit, or is not a map of group names to user lists.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = read_snapshot(path).map_err(DirectoryError::Unavailable)?;
        Self::from_json(&content)
    }

    /// Parses a directory from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the JSON is malformed.
    pub fn from_json(content: &str) -> Result<Self, DirectoryError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(content)
            .map_err(|err| DirectoryError::Unavailable(format!("invalid directory snapshot: {err}")))?;
        let groups = raw
            .into_iter()
            .map(|(group, members)| (group, members.into_iter().map(UserId::from).collect()))
            .collect();
        Ok(Self {
            groups,
        })
    }

    /// Returns the number of groups held.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl GroupDirectory for StaticGroupDirectory {
    fn group_members(&self, group: &str) -> Result<BTreeSet<UserId>, DirectoryError> {
        self.groups.get(group).cloned().ok_or_else(|| DirectoryError::UnknownGroup(group.to_string()))
    }
}
