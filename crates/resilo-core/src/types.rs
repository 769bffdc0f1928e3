//! # Core Type Definitions
//!
//! Identifiers, the rating `Level` wrapper, the derived `ProgressState`
//! classification, and the crate-wide error type.
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for an assessment session.
///
/// A session is one assessor's pass over the topic catalogue; each
/// stored rating entry belongs to exactly one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Unique identifier for an assessment topic.
///
/// The dimension/theme/topic hierarchy itself is external data; this
/// crate only ever sees opaque topic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicId(pub u64);

// =============================================================================
// RATING LEVEL
// =============================================================================

/// One level on the maturity rating scale.
///
/// Levels are opaque small integers supplied by the configured
/// [`RatingScale`](crate::RatingScale); the engine never invents levels,
/// it only compares and clamps them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Level(pub u8);

impl Level {
    /// Create a new level with the given value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Get the raw level value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// PROGRESS STATE
// =============================================================================

/// Derived three-way classification of how resolved a topic's snapshot is.
///
/// Never stored as an input: always recomputed from the snapshot via
/// [`RatingRules::progress_state`](crate::RatingRules::progress_state),
/// on both the interactive side and the write path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    /// The snapshot is entirely empty: no ratings, no notes.
    #[default]
    NotStarted,
    /// Something has been entered but the ratings are not yet resolved.
    InProgress,
    /// Current has a determination and desired is explicitly resolved.
    Complete,
}

impl ProgressState {
    /// Get the wire/storage name of this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressState::NotStarted => "not_started",
            ProgressState::InProgress => "in_progress",
            ProgressState::Complete => "complete",
        }
    }
}

impl std::fmt::Display for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Resilo system.
///
/// Interactive rule application never produces these: invalid selections
/// degrade to unchanged snapshots. Errors are reserved for the write
/// path (rejected submissions), the store, and the archive format.
#[derive(Debug, Error)]
pub enum ResiloError {
    /// A submitted maturity level is not on the configured rating scale.
    #[error("Level {0} is not on the rating scale")]
    InvalidLevel(Level),

    /// Current is flagged N/A but still carries a maturity level.
    #[error("Current rating is marked N/A but still holds a maturity level")]
    CurrentNaConflict,

    /// Desired is flagged N/A but still carries a maturity level.
    #[error("Desired rating is marked N/A but still holds a maturity level")]
    DesiredNaConflict,

    /// Current is N/A but desired is not, and treat-NA-as-zero is off.
    #[error("Desired rating must be N/A while current is N/A")]
    DesiredMustBeNa,

    /// Desired maturity fell below current maturity.
    #[error("Desired maturity {desired} is below current maturity {current}")]
    DesiredBelowCurrent {
        /// The submitted current maturity.
        current: Level,
        /// The submitted desired maturity.
        desired: Level,
    },

    /// A field exceeded a configured size limit.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// The requested session does not exist.
    #[error("Session not found: {0:?}")]
    SessionNotFound(SessionId),

    /// The requested rating entry does not exist.
    #[error("Entry not found: {0:?} / {1:?}")]
    EntryNotFound(SessionId, TopicId),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(Level(1) < Level(2));
        assert!(Level(5) > Level(4));
        assert_eq!(Level::new(3).value(), 3);
    }

    #[test]
    fn progress_state_names() {
        assert_eq!(ProgressState::NotStarted.as_str(), "not_started");
        assert_eq!(ProgressState::InProgress.as_str(), "in_progress");
        assert_eq!(ProgressState::Complete.as_str(), "complete");
    }

    #[test]
    fn progress_state_serde_snake_case() {
        let json = serde_json::to_string(&ProgressState::InProgress).expect("serialize");
        assert_eq!(json, "\"in_progress\"");

        let state: ProgressState = serde_json::from_str("\"complete\"").expect("deserialize");
        assert_eq!(state, ProgressState::Complete);
    }

    #[test]
    fn error_messages_name_the_levels() {
        let err = ResiloError::DesiredBelowCurrent {
            current: Level(4),
            desired: Level(2),
        };
        assert_eq!(
            err.to_string(),
            "Desired maturity 2 is below current maturity 4"
        );
    }
}
