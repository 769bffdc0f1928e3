//! # Session Archive Format
//!
//! Binary serialization for session backups: one session record plus
//! all of its rating entries. File I/O lives in the app layer; this
//! module is pure bytes-in/bytes-out.
//!
//! Format: Header (5 bytes) + postcard-serialized archive data.
//! - 4 bytes: Magic ("RSLO")
//! - 1 byte: Version
//!
//! Pre-deserialization validation (minimum size, maximum payload size,
//! header check) runs before any payload parsing so corrupted or
//! oversized archives fail fast.

use crate::limits::{FORMAT_VERSION, MAGIC_BYTES, MAX_ARCHIVE_PAYLOAD_SIZE};
use crate::store::{SessionRecord, StoredEntry};
use crate::{ResiloError, TopicId};
use serde::{Deserialize, Serialize};

/// Minimum valid archive size (header only).
const MIN_FILE_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The archive header precedes all session data.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl ArchiveHeader {
    /// Create a new header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), ResiloError> {
        if &self.magic != MAGIC_BYTES {
            return Err(ResiloError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(ResiloError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResiloError> {
        if bytes.len() < MIN_FILE_SIZE {
            return Err(ResiloError::SerializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ARCHIVE PAYLOAD
// =============================================================================

/// One archived rating entry with its topic id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedEntry {
    /// The topic the entry belongs to.
    pub topic_id: TopicId,
    /// The stored entry as written at archive time.
    pub entry: StoredEntry,
}

/// A complete session backup: the record plus every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionArchive {
    /// The session record.
    pub record: SessionRecord,
    /// All entries of the session, in topic-id order.
    pub entries: Vec<ArchivedEntry>,
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a session archive to bytes (header + payload).
pub fn archive_to_bytes(archive: &SessionArchive) -> Result<Vec<u8>, ResiloError> {
    let header = ArchiveHeader::new();
    let payload = postcard::to_stdvec(archive)
        .map_err(|e| ResiloError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_FILE_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a session archive from bytes.
///
/// Validates minimum size, maximum payload size, and the header before
/// attempting payload deserialization.
pub fn archive_from_bytes(bytes: &[u8]) -> Result<SessionArchive, ResiloError> {
    if bytes.len() < MIN_FILE_SIZE {
        return Err(ResiloError::SerializationError(
            "Data too short: minimum 5 bytes required".to_string(),
        ));
    }
    if bytes.len() > MAX_ARCHIVE_PAYLOAD_SIZE {
        return Err(ResiloError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_ARCHIVE_PAYLOAD_SIZE
        )));
    }

    let header = ArchiveHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_FILE_SIZE..];
    let archive: SessionArchive = postcard::from_bytes(payload).map_err(|e| {
        ResiloError::DeserializationError(format!("Failed to deserialize archive: {}", e))
    })?;
    Ok(archive)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, ProgressState, TopicRatingSnapshot};

    fn sample_archive() -> SessionArchive {
        SessionArchive {
            record: SessionRecord {
                name: "annual review".to_string(),
                assessor: Some("sam".to_string()),
                notes: None,
                created_at_secs: 1_700_000_000,
            },
            entries: vec![ArchivedEntry {
                topic_id: TopicId(4),
                entry: StoredEntry {
                    snapshot: TopicRatingSnapshot {
                        current_maturity: Some(Level(2)),
                        desired_maturity: Some(Level(4)),
                        evidence_links: vec!["https://example.com/runbook".to_string()],
                        ..TopicRatingSnapshot::new()
                    },
                    progress: ProgressState::Complete,
                    updated_at_secs: 1_700_000_500,
                },
            }],
        }
    }

    #[test]
    fn header_roundtrip() {
        let header = ArchiveHeader::new();
        let bytes = header.to_bytes();
        let restored = ArchiveHeader::from_bytes(&bytes).expect("parse header");

        assert_eq!(restored.magic, *MAGIC_BYTES);
        assert_eq!(restored.version, FORMAT_VERSION);
    }

    #[test]
    fn archive_roundtrip() {
        let archive = sample_archive();
        let bytes = archive_to_bytes(&archive).expect("serialize");
        let restored = archive_from_bytes(&bytes).expect("deserialize");
        assert_eq!(restored, archive);
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = archive_to_bytes(&sample_archive()).expect("serialize");
        bytes[0..4].copy_from_slice(b"XXXX");

        assert!(archive_from_bytes(&bytes).is_err());
    }

    #[test]
    fn unsupported_version_rejected() {
        let mut bytes = archive_to_bytes(&sample_archive()).expect("serialize");
        bytes[4] = FORMAT_VERSION + 1;

        assert!(archive_from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncated_data_rejected() {
        assert!(archive_from_bytes(&[0u8; 3]).is_err());
    }
}
