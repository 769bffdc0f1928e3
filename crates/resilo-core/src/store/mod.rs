//! # Assessment Store
//!
//! Storage of rating entries, one per (session, topic) pair, plus the
//! session records they hang off.
//!
//! ## Storage Backends
//!
//! The store supports two backends behind one API:
//! - `InMemory`: `BTreeMap`-backed (fast, volatile)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage
//!
//! Timestamps are caller-supplied epoch seconds; the store itself never
//! reads a clock, keeping this crate deterministic.

mod redb_store;

pub use redb_store::RedbStore;

use crate::formats::{ArchivedEntry, SessionArchive};
use crate::{ProgressState, ResiloError, SessionId, TopicId, TopicRatingSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// STORED RECORDS
// =============================================================================

/// One persisted rating entry: the snapshot plus its derived progress
/// classification and a last-updated timestamp.
///
/// `progress` is always recomputed by the writer via
/// [`RatingRules::progress_state`](crate::RatingRules::progress_state);
/// it is stored denormalized so listings and summaries need no engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// The rating snapshot as validated on the write path.
    pub snapshot: TopicRatingSnapshot,
    /// Progress classification derived from the snapshot at write time.
    pub progress: ProgressState,
    /// Last update time, caller-supplied epoch seconds.
    pub updated_at_secs: u64,
}

/// Metadata for one assessment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Display name of the session.
    pub name: String,
    /// Who ran the assessment, if recorded.
    pub assessor: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation time, caller-supplied epoch seconds.
    pub created_at_secs: u64,
}

// =============================================================================
// BACKENDS
// =============================================================================

/// In-memory store state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: BTreeMap<SessionId, SessionRecord>,
    entries: BTreeMap<(SessionId, TopicId), StoredEntry>,
    next_session_id: u64,
}

/// Storage backend for an [`AssessmentStore`].
#[derive(Debug)]
pub enum StoreBackend {
    /// In-memory maps (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::default())
    }
}

// NOTE: StoreBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned.

// =============================================================================
// ASSESSMENT STORE
// =============================================================================

/// The entry store behind the API and CLI.
///
/// All methods return `Result`; callers decide whether a failure is
/// fatal (CLI) or maps to an HTTP status (API).
#[derive(Debug, Default)]
pub struct AssessmentStore {
    backend: StoreBackend,
}

impl AssessmentStore {
    /// Create a new empty store with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path. All writes
    /// are persisted to disk as they happen.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, ResiloError> {
        let redb = RedbStore::open(path)?;
        Ok(Self {
            backend: StoreBackend::Persistent(redb),
        })
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    /// Create a new session, returning its assigned id.
    pub fn create_session(&mut self, record: SessionRecord) -> Result<SessionId, ResiloError> {
        match &mut self.backend {
            StoreBackend::InMemory(mem) => {
                mem.next_session_id += 1;
                let id = SessionId(mem.next_session_id);
                mem.sessions.insert(id, record);
                Ok(id)
            }
            StoreBackend::Persistent(redb) => redb.create_session(&record),
        }
    }

    /// Fetch one session record.
    pub fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, ResiloError> {
        match &self.backend {
            StoreBackend::InMemory(mem) => Ok(mem.sessions.get(&id).cloned()),
            StoreBackend::Persistent(redb) => redb.session(id),
        }
    }

    /// List all sessions in id order.
    pub fn sessions(&self) -> Result<Vec<(SessionId, SessionRecord)>, ResiloError> {
        match &self.backend {
            StoreBackend::InMemory(mem) => Ok(mem
                .sessions
                .iter()
                .map(|(id, record)| (*id, record.clone()))
                .collect()),
            StoreBackend::Persistent(redb) => redb.sessions(),
        }
    }

    /// Number of sessions in the store.
    pub fn session_count(&self) -> Result<u64, ResiloError> {
        match &self.backend {
            StoreBackend::InMemory(mem) => Ok(mem.sessions.len() as u64),
            StoreBackend::Persistent(redb) => redb.session_count(),
        }
    }

    // =========================================================================
    // ENTRIES
    // =========================================================================

    /// Insert or replace the entry for a (session, topic) pair.
    ///
    /// Fails with `SessionNotFound` when the session does not exist:
    /// entries never dangle without a session record.
    pub fn put_entry(
        &mut self,
        session: SessionId,
        topic: TopicId,
        entry: StoredEntry,
    ) -> Result<(), ResiloError> {
        if self.session(session)?.is_none() {
            return Err(ResiloError::SessionNotFound(session));
        }
        match &mut self.backend {
            StoreBackend::InMemory(mem) => {
                mem.entries.insert((session, topic), entry);
                Ok(())
            }
            StoreBackend::Persistent(redb) => redb.put_entry(session, topic, &entry),
        }
    }

    /// Fetch one entry.
    pub fn entry(
        &self,
        session: SessionId,
        topic: TopicId,
    ) -> Result<Option<StoredEntry>, ResiloError> {
        match &self.backend {
            StoreBackend::InMemory(mem) => Ok(mem.entries.get(&(session, topic)).cloned()),
            StoreBackend::Persistent(redb) => redb.entry(session, topic),
        }
    }

    /// All entries of a session, in topic-id order.
    pub fn entries(&self, session: SessionId) -> Result<Vec<(TopicId, StoredEntry)>, ResiloError> {
        match &self.backend {
            StoreBackend::InMemory(mem) => Ok(mem
                .entries
                .range((session, TopicId(0))..=(session, TopicId(u64::MAX)))
                .map(|((_, topic), entry)| (*topic, entry.clone()))
                .collect()),
            StoreBackend::Persistent(redb) => redb.entries(session),
        }
    }

    /// Total number of entries across all sessions.
    pub fn entry_count(&self) -> Result<u64, ResiloError> {
        match &self.backend {
            StoreBackend::InMemory(mem) => Ok(mem.entries.len() as u64),
            StoreBackend::Persistent(redb) => redb.entry_count(),
        }
    }

    // =========================================================================
    // ARCHIVES
    // =========================================================================

    /// Assemble the archive of one session: its record plus every entry.
    pub fn export_session(&self, id: SessionId) -> Result<SessionArchive, ResiloError> {
        let record = self.session(id)?.ok_or(ResiloError::SessionNotFound(id))?;
        let entries = self
            .entries(id)?
            .into_iter()
            .map(|(topic_id, entry)| ArchivedEntry { topic_id, entry })
            .collect();
        Ok(SessionArchive { record, entries })
    }

    /// Import an archived session. The session gets a fresh id in this
    /// store.
    pub fn import_session(&mut self, archive: SessionArchive) -> Result<SessionId, ResiloError> {
        let id = self.create_session(archive.record)?;
        for archived in archive.entries {
            self.put_entry(id, archived.topic_id, archived.entry)?;
        }
        Ok(id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
