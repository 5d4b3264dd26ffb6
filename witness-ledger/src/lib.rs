//! Append-only store of record accesses.
//!
//! The collaborator the session layer synchronizes: a thread-safe, grow-only,
//! insertion-ordered set of record accesses. Records are never deleted or
//! reordered; adding an access that is already present is a no-op.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// A single logged access to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAccess {
    /// Identity of the user who performed the access.
    pub user_id: String,
    /// Identifier of the record that was accessed.
    pub record_id: String,
    /// Seconds since the Unix epoch at which the access occurred.
    pub timestamp: u64,
}

impl RecordAccess {
    /// Create a record access.
    pub fn new(user_id: impl Into<String>, record_id: impl Into<String>, timestamp: u64) -> Self {
        Self {
            user_id: user_id.into(),
            record_id: record_id.into(),
            timestamp,
        }
    }
}

/// Thread-safe grow-only set of record accesses.
///
/// Insertion order is preserved and duplicates are ignored.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<RecordAccess>>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record access. A no-op if an equal access is already stored.
    pub fn add_record_access(&self, access: RecordAccess) {
        let mut records = self.records.write().unwrap();
        if !records.contains(&access) {
            records.push(access);
        }
    }

    /// All accesses recorded so far, oldest first.
    pub fn all_record_accesses(&self) -> Vec<RecordAccess> {
        self.records.read().unwrap().clone()
    }

    /// Number of recorded accesses.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
