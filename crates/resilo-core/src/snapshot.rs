//! # Topic Rating Snapshot
//!
//! The single entity the rule engine manipulates: one topic's dual
//! rating plus its free-text notes. The snapshot is owned by the caller
//! for the duration of one edit; every engine operation is a pure
//! `(snapshot, input) -> snapshot` transformation and nothing is
//! retained between calls.

use crate::Level;
use serde::{Deserialize, Serialize};

/// One topic's rating state.
///
/// Invariants (upheld by every engine-produced mutation, re-checked on
/// the write path by [`validate_submission`](crate::validate_submission)):
/// 1. `current_is_na` implies `current_maturity` is `None`.
/// 2. `desired_is_na` implies `desired_maturity` is `None`.
/// 3. `current_is_na` implies `desired_is_na`, unless the
///    treat-NA-as-zero policy is enabled.
/// 4. When both maturities are set, `desired >= current`.
/// 5. `evidence_links` entries are non-empty trimmed strings; duplicates
///    are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TopicRatingSnapshot {
    /// The assessed present-state maturity, if rated.
    pub current_maturity: Option<Level>,
    /// Whether the topic is marked not-applicable for current state.
    pub current_is_na: bool,
    /// The target maturity the assessor wants to reach.
    pub desired_maturity: Option<Level>,
    /// Whether the desired rating is marked not-applicable.
    pub desired_is_na: bool,
    /// Free-text comment, may be empty.
    pub comment: String,
    /// Ordered evidence references (URLs or citations), may be empty.
    pub evidence_links: Vec<String>,
}

impl TopicRatingSnapshot {
    /// Create an all-empty snapshot (the not-started state).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the assessor has left any notes: a non-blank comment or
    /// at least one evidence link.
    #[must_use]
    pub fn has_notes(&self) -> bool {
        !self.comment.trim().is_empty() || !self.evidence_links.is_empty()
    }
}

/// Normalize evidence links: trim whitespace, drop entries that are
/// empty after trimming. Order and duplicates are preserved.
#[must_use]
pub fn normalize_evidence_links(links: &[String]) -> Vec<String> {
    links
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_is_empty() {
        let snapshot = TopicRatingSnapshot::new();
        assert_eq!(snapshot.current_maturity, None);
        assert!(!snapshot.current_is_na);
        assert_eq!(snapshot.desired_maturity, None);
        assert!(!snapshot.desired_is_na);
        assert!(snapshot.comment.is_empty());
        assert!(snapshot.evidence_links.is_empty());
        assert!(!snapshot.has_notes());
    }

    #[test]
    fn blank_comment_is_not_a_note() {
        let snapshot = TopicRatingSnapshot {
            comment: "   \t".to_string(),
            ..TopicRatingSnapshot::new()
        };
        assert!(!snapshot.has_notes());
    }

    #[test]
    fn evidence_counts_as_a_note() {
        let snapshot = TopicRatingSnapshot {
            evidence_links: vec!["https://example.com/report".to_string()],
            ..TopicRatingSnapshot::new()
        };
        assert!(snapshot.has_notes());
    }

    #[test]
    fn normalize_trims_and_drops_empties() {
        let links = vec![
            "  https://a.example  ".to_string(),
            String::new(),
            "   ".to_string(),
            "https://b.example".to_string(),
        ];
        assert_eq!(
            normalize_evidence_links(&links),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn normalize_keeps_duplicates_and_order() {
        let links = vec![
            "https://a.example".to_string(),
            "https://a.example".to_string(),
        ];
        assert_eq!(normalize_evidence_links(&links).len(), 2);
    }
}
