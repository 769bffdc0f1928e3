//! # redb-backed Entry Storage
//!
//! A disk-backed assessment store using the redb embedded database:
//! ACID transactions, crash safety (copy-on-write B-trees), and MVCC
//! with zero configuration. Entry and session values are
//! postcard-encoded.

use crate::{ResiloError, SessionId, TopicId};
use crate::store::{SessionRecord, StoredEntry};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for session records: session id -> serialized SessionRecord.
const SESSIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("sessions");

/// Table for rating entries: (session id, topic id) -> serialized StoredEntry.
const ENTRIES: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("entries");

/// Table for metadata: key string -> value u64.
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

/// A disk-backed assessment store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next session id to assign.
    next_session_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_session_id", &self.next_session_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ResiloError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| ResiloError::IoError(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(SESSIONS)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(ENTRIES)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
        }

        let next_session_id = {
            let read_txn = db
                .begin_read()
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            table
                .get("next_session_id")
                .map_err(|e| ResiloError::IoError(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        Ok(Self {
            db,
            next_session_id,
        })
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    /// Create a new session and persist the updated id counter
    /// atomically with the record.
    pub fn create_session(&mut self, record: &SessionRecord) -> Result<SessionId, ResiloError> {
        let assigned = self.next_session_id + 1;
        let bytes = postcard::to_stdvec(record)
            .map_err(|e| ResiloError::SerializationError(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        {
            let mut sessions = write_txn
                .open_table(SESSIONS)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            sessions
                .insert(assigned, bytes.as_slice())
                .map_err(|e| ResiloError::IoError(e.to_string()))?;

            let mut metadata = write_txn
                .open_table(METADATA)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            metadata
                .insert("next_session_id", assigned)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;

        self.next_session_id = assigned;
        Ok(SessionId(assigned))
    }

    /// Fetch one session record.
    pub fn session(&self, id: SessionId) -> Result<Option<SessionRecord>, ResiloError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(SESSIONS)
            .map_err(|e| ResiloError::IoError(e.to_string()))?;

        let Some(guard) = table
            .get(id.0)
            .map_err(|e| ResiloError::IoError(e.to_string()))?
        else {
            return Ok(None);
        };

        let record: SessionRecord = postcard::from_bytes(guard.value())
            .map_err(|e| ResiloError::DeserializationError(e.to_string()))?;
        Ok(Some(record))
    }

    /// List all sessions in id order.
    pub fn sessions(&self) -> Result<Vec<(SessionId, SessionRecord)>, ResiloError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(SESSIONS)
            .map_err(|e| ResiloError::IoError(e.to_string()))?;

        let mut out = Vec::new();
        for item in table
            .iter()
            .map_err(|e| ResiloError::IoError(e.to_string()))?
        {
            let (key, value) = item.map_err(|e| ResiloError::IoError(e.to_string()))?;
            let record: SessionRecord = postcard::from_bytes(value.value())
                .map_err(|e| ResiloError::DeserializationError(e.to_string()))?;
            out.push((SessionId(key.value()), record));
        }
        Ok(out)
    }

    /// Number of sessions in the store.
    pub fn session_count(&self) -> Result<u64, ResiloError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(SESSIONS)
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        table.len().map_err(|e| ResiloError::IoError(e.to_string()))
    }

    // =========================================================================
    // ENTRIES
    // =========================================================================

    /// Insert or replace one rating entry.
    pub fn put_entry(
        &mut self,
        session: SessionId,
        topic: TopicId,
        entry: &StoredEntry,
    ) -> Result<(), ResiloError> {
        let bytes = postcard::to_stdvec(entry)
            .map_err(|e| ResiloError::SerializationError(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        {
            let mut entries = write_txn
                .open_table(ENTRIES)
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
            entries
                .insert((session.0, topic.0), bytes.as_slice())
                .map_err(|e| ResiloError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| ResiloError::IoError(e.to_string()))
    }

    /// Fetch one rating entry.
    pub fn entry(
        &self,
        session: SessionId,
        topic: TopicId,
    ) -> Result<Option<StoredEntry>, ResiloError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| ResiloError::IoError(e.to_string()))?;

        let Some(guard) = table
            .get((session.0, topic.0))
            .map_err(|e| ResiloError::IoError(e.to_string()))?
        else {
            return Ok(None);
        };

        let entry: StoredEntry = postcard::from_bytes(guard.value())
            .map_err(|e| ResiloError::DeserializationError(e.to_string()))?;
        Ok(Some(entry))
    }

    /// All entries of a session, in topic-id order.
    pub fn entries(&self, session: SessionId) -> Result<Vec<(TopicId, StoredEntry)>, ResiloError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| ResiloError::IoError(e.to_string()))?;

        let mut out = Vec::new();
        for item in table
            .range((session.0, 0)..=(session.0, u64::MAX))
            .map_err(|e| ResiloError::IoError(e.to_string()))?
        {
            let (key, value) = item.map_err(|e| ResiloError::IoError(e.to_string()))?;
            let entry: StoredEntry = postcard::from_bytes(value.value())
                .map_err(|e| ResiloError::DeserializationError(e.to_string()))?;
            out.push((TopicId(key.value().1), entry));
        }
        Ok(out)
    }

    /// Total number of entries across all sessions.
    pub fn entry_count(&self) -> Result<u64, ResiloError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ENTRIES)
            .map_err(|e| ResiloError::IoError(e.to_string()))?;
        table.len().map_err(|e| ResiloError::IoError(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, ProgressState, TopicRatingSnapshot};

    fn sample_entry() -> StoredEntry {
        StoredEntry {
            snapshot: TopicRatingSnapshot {
                current_maturity: Some(Level(2)),
                desired_maturity: Some(Level(4)),
                comment: "mitigation plan agreed".to_string(),
                ..TopicRatingSnapshot::new()
            },
            progress: ProgressState::Complete,
            updated_at_secs: 1_700_000_000,
        }
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("resilo.db");

        let sid = {
            let mut store = RedbStore::open(&path).expect("open");
            let sid = store
                .create_session(&SessionRecord {
                    name: "q3 review".to_string(),
                    assessor: None,
                    notes: None,
                    created_at_secs: 1_700_000_000,
                })
                .expect("create");
            store
                .put_entry(sid, TopicId(9), &sample_entry())
                .expect("put");
            sid
        };

        let store = RedbStore::open(&path).expect("reopen");
        assert_eq!(store.session_count().expect("count"), 1);
        let entry = store.entry(sid, TopicId(9)).expect("get").expect("present");
        assert_eq!(entry, sample_entry());
    }

    #[test]
    fn session_ids_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("resilo.db");

        {
            let mut store = RedbStore::open(&path).expect("open");
            let first = store
                .create_session(&SessionRecord {
                    name: "first".to_string(),
                    assessor: None,
                    notes: None,
                    created_at_secs: 0,
                })
                .expect("create");
            assert_eq!(first, SessionId(1));
        }

        let mut store = RedbStore::open(&path).expect("reopen");
        let second = store
            .create_session(&SessionRecord {
                name: "second".to_string(),
                assessor: None,
                notes: None,
                created_at_secs: 0,
            })
            .expect("create");
        assert_eq!(second, SessionId(2));
    }

    #[test]
    fn range_scan_stays_within_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("resilo.db");
        let mut store = RedbStore::open(&path).expect("open");

        let record = SessionRecord {
            name: "s".to_string(),
            assessor: None,
            notes: None,
            created_at_secs: 0,
        };
        let a = store.create_session(&record).expect("create");
        let b = store.create_session(&record).expect("create");

        store.put_entry(a, TopicId(u64::MAX), &sample_entry()).expect("put");
        store.put_entry(b, TopicId(0), &sample_entry()).expect("put");

        assert_eq!(store.entries(a).expect("list").len(), 1);
        assert_eq!(store.entries(b).expect("list").len(), 1);
    }
}
