//! # Write-Path Validation
//!
//! Server-side re-validation of submitted snapshots. Interactive
//! callers already run every selection through [`RatingRules`], but the
//! write path never trusts client-enforced state: a submitted payload
//! that violates the snapshot invariants is rejected with a typed error
//! instead of being silently repaired.

use crate::limits::{MAX_COMMENT_LENGTH, MAX_EVIDENCE_LINK_LENGTH, MAX_EVIDENCE_LINKS};
use crate::{RatingRules, ResiloError, TopicRatingSnapshot};

/// Validate a submitted snapshot against the rating invariants.
///
/// Checks, in order:
/// 1. N/A flags are mutually exclusive with a set maturity (current and
///    desired).
/// 2. An N/A current requires an N/A desired, unless treat-NA-as-zero
///    is enabled.
/// 3. Every set maturity is on the configured scale.
/// 4. When both maturities are set, `desired >= current`.
///
/// Returns the first violation found.
pub fn validate_submission(
    snapshot: &TopicRatingSnapshot,
    rules: &RatingRules,
) -> Result<(), ResiloError> {
    if snapshot.current_is_na && snapshot.current_maturity.is_some() {
        return Err(ResiloError::CurrentNaConflict);
    }
    if snapshot.desired_is_na && snapshot.desired_maturity.is_some() {
        return Err(ResiloError::DesiredNaConflict);
    }
    if snapshot.current_is_na && !snapshot.desired_is_na && !rules.treat_na_as_zero() {
        return Err(ResiloError::DesiredMustBeNa);
    }

    for level in [snapshot.current_maturity, snapshot.desired_maturity]
        .into_iter()
        .flatten()
    {
        if !rules.scale().contains(level) {
            return Err(ResiloError::InvalidLevel(level));
        }
    }

    if let (Some(current), Some(desired)) = (snapshot.current_maturity, snapshot.desired_maturity)
    {
        if desired < current {
            return Err(ResiloError::DesiredBelowCurrent { current, desired });
        }
    }

    Ok(())
}

/// Validate the size of the free-text fields on a submission.
///
/// Applied at every boundary that accepts caller-supplied notes (HTTP
/// payloads and CLI flags) before the snapshot reaches the store.
pub fn validate_note_limits(comment: &str, evidence_links: &[String]) -> Result<(), ResiloError> {
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(ResiloError::LimitExceeded(format!(
            "comment length {} exceeds maximum {} bytes",
            comment.len(),
            MAX_COMMENT_LENGTH
        )));
    }
    if evidence_links.len() > MAX_EVIDENCE_LINKS {
        return Err(ResiloError::LimitExceeded(format!(
            "{} evidence links exceed maximum of {}",
            evidence_links.len(),
            MAX_EVIDENCE_LINKS
        )));
    }
    for link in evidence_links {
        if link.len() > MAX_EVIDENCE_LINK_LENGTH {
            return Err(ResiloError::LimitExceeded(format!(
                "evidence link length {} exceeds maximum {} bytes",
                link.len(),
                MAX_EVIDENCE_LINK_LENGTH
            )));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
