//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use resilo_core::{
    Level, ProgressState, ResiloError, SessionRecord, StoredEntry, TopicRatingSnapshot,
    limits::{MAX_ASSESSOR_LENGTH, MAX_NOTES_LENGTH, MAX_SESSION_NAME_LENGTH},
    normalize_evidence_links, validate_note_limits,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Store status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session_count: u64,
    pub entry_count: u64,
    pub treat_na_as_zero: bool,
    pub scale_levels: Vec<u8>,
}

// =============================================================================
// ERROR BODY
// =============================================================================

/// Plain error body for read endpoints (writes carry their own
/// success/error envelope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =============================================================================
// SESSION REQUEST/RESPONSE
// =============================================================================

/// Session creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateRequest {
    pub name: String,
    #[serde(default)]
    pub assessor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SessionCreateRequest {
    /// Convert to a session record, validating field sizes.
    ///
    /// Rejects an empty or oversized name and oversized optional
    /// fields at the API boundary, before data reaches the store.
    pub fn to_record(&self, created_at_secs: u64) -> Result<SessionRecord, ResiloError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ResiloError::LimitExceeded(
                "session name must not be empty".to_string(),
            ));
        }
        if name.len() > MAX_SESSION_NAME_LENGTH {
            return Err(ResiloError::LimitExceeded(format!(
                "session name length {} exceeds maximum {} bytes",
                name.len(),
                MAX_SESSION_NAME_LENGTH
            )));
        }
        if let Some(assessor) = &self.assessor {
            if assessor.len() > MAX_ASSESSOR_LENGTH {
                return Err(ResiloError::LimitExceeded(format!(
                    "assessor length {} exceeds maximum {} bytes",
                    assessor.len(),
                    MAX_ASSESSOR_LENGTH
                )));
            }
        }
        if let Some(notes) = &self.notes {
            if notes.len() > MAX_NOTES_LENGTH {
                return Err(ResiloError::LimitExceeded(format!(
                    "notes length {} exceeds maximum {} bytes",
                    notes.len(),
                    MAX_NOTES_LENGTH
                )));
            }
        }

        Ok(SessionRecord {
            name: name.to_string(),
            assessor: self.assessor.as_deref().map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            created_at_secs,
        })
    }
}

/// Session creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateResponse {
    pub success: bool,
    pub id: Option<u64>,
    pub error: Option<String>,
}

impl SessionCreateResponse {
    pub fn success(id: u64) -> Self {
        Self {
            success: true,
            id: Some(id),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(msg.into()),
        }
    }
}

/// One session in listings and detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionJson {
    pub id: u64,
    pub name: String,
    pub assessor: Option<String>,
    pub notes: Option<String>,
    pub created_at_secs: u64,
}

impl SessionJson {
    pub fn from_record(id: u64, record: &SessionRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            assessor: record.assessor.clone(),
            notes: record.notes.clone(),
            created_at_secs: record.created_at_secs,
        }
    }
}

/// Session detail: the record plus its entry count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub session: SessionJson,
    pub entry_count: usize,
}

// =============================================================================
// RATING REQUEST/RESPONSE
// =============================================================================

/// A submitted rating for one topic.
///
/// `progress_state` is what the client derived for itself; the server
/// recomputes it from the snapshot and never trusts the submitted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingUpdateRequest {
    #[serde(default)]
    pub current_maturity: Option<u8>,
    #[serde(default)]
    pub current_is_na: bool,
    #[serde(default)]
    pub desired_maturity: Option<u8>,
    #[serde(default)]
    pub desired_is_na: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub evidence_links: Vec<String>,
    #[serde(default)]
    pub progress_state: Option<ProgressState>,
}

impl RatingUpdateRequest {
    /// Convert to a snapshot, normalizing evidence links and validating
    /// field sizes. Invariant validation happens separately via
    /// [`validate_submission`](resilo_core::validate_submission).
    pub fn to_snapshot(&self) -> Result<TopicRatingSnapshot, ResiloError> {
        let comment = self.comment.clone().unwrap_or_default();
        let evidence_links = normalize_evidence_links(&self.evidence_links);
        validate_note_limits(&comment, &evidence_links)?;

        Ok(TopicRatingSnapshot {
            current_maturity: self.current_maturity.map(Level::new),
            current_is_na: self.current_is_na,
            desired_maturity: self.desired_maturity.map(Level::new),
            desired_is_na: self.desired_is_na,
            comment,
            evidence_links,
        })
    }
}

/// Response to a single rating write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingWriteResponse {
    pub success: bool,
    pub topic_id: Option<u64>,
    pub progress_state: Option<ProgressState>,
    pub updated_at_secs: Option<u64>,
    pub error: Option<String>,
}

impl RatingWriteResponse {
    pub fn success(topic_id: u64, progress: ProgressState, updated_at_secs: u64) -> Self {
        Self {
            success: true,
            topic_id: Some(topic_id),
            progress_state: Some(progress),
            updated_at_secs: Some(updated_at_secs),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            topic_id: None,
            progress_state: None,
            updated_at_secs: None,
            error: Some(msg.into()),
        }
    }
}

/// One item of a bulk rating write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRatingItem {
    pub topic_id: u64,
    #[serde(flatten)]
    pub rating: RatingUpdateRequest,
}

/// Bulk rating write request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRatingUpdateRequest {
    pub updates: Vec<BulkRatingItem>,
}

/// Response to a bulk rating write. Validation is all-or-nothing: on
/// failure nothing is written and `failed_topic_id` names the offender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRatingResponse {
    pub success: bool,
    pub written: usize,
    pub failed_topic_id: Option<u64>,
    pub error: Option<String>,
}

impl BulkRatingResponse {
    pub fn success(written: usize) -> Self {
        Self {
            success: true,
            written,
            failed_topic_id: None,
            error: None,
        }
    }

    pub fn error(failed_topic_id: Option<u64>, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            written: 0,
            failed_topic_id,
            error: Some(msg.into()),
        }
    }
}

/// One stored entry as returned by read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryJson {
    pub topic_id: u64,
    #[serde(flatten)]
    pub snapshot: TopicRatingSnapshot,
    pub progress_state: ProgressState,
    pub updated_at_secs: u64,
}

impl EntryJson {
    pub fn from_entry(topic_id: u64, entry: &StoredEntry) -> Self {
        Self {
            topic_id,
            snapshot: entry.snapshot.clone(),
            progress_state: entry.progress,
            updated_at_secs: entry.updated_at_secs,
        }
    }
}

/// Allowed desired levels for a topic's stored snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedDesiredResponse {
    pub topic_id: u64,
    pub levels: Vec<u8>,
}

// =============================================================================
// PROGRESS RESPONSE
// =============================================================================

/// Progress summary for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub session_id: u64,
    #[serde(flatten)]
    pub metrics: resilo_core::AssessmentMetrics,
}

// =============================================================================
// ARCHIVE RESPONSE
// =============================================================================

/// Binary archive download response (base64-encoded archive bytes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded
    pub error: Option<String>,
}

impl ArchiveResponse {
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                &data,
            )),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
