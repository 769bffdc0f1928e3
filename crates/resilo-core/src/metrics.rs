//! # Assessment Metrics
//!
//! Aggregation over a session's stored entries for progress summaries
//! and dashboards.
//!
//! Averages are integer fixed-point in hundredths (e.g. `325` = 3.25)
//! so the whole crate stays free of floating-point arithmetic.

use crate::ProgressState;
use crate::store::StoredEntry;
use serde::{Deserialize, Serialize};

/// Aggregated progress and rating statistics for a set of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssessmentMetrics {
    /// Total number of entries folded in.
    pub total: usize,
    /// Entries classified not-started.
    pub not_started: usize,
    /// Entries classified in-progress.
    pub in_progress: usize,
    /// Entries classified complete.
    pub complete: usize,
    /// Entries with current marked N/A.
    pub current_na: usize,
    /// Entries with a current maturity level set.
    pub rated_current: usize,
    /// Entries with a desired maturity level set.
    pub rated_desired: usize,
    /// Mean current maturity in hundredths, `None` when nothing is rated.
    pub average_current_centi: Option<u64>,
    /// Mean desired maturity in hundredths, `None` when nothing is rated.
    pub average_desired_centi: Option<u64>,
    /// Mean desired-minus-current gap in hundredths, over entries where
    /// both levels are set. `None` when no entry qualifies.
    pub average_gap_centi: Option<i64>,
    /// Share of entries classified complete, 0..=100.
    pub completion_percent: u8,
}

impl AssessmentMetrics {
    /// Fold a set of stored entries into summary metrics.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a StoredEntry>) -> Self {
        let mut metrics = Self::default();
        let mut current_sum: u64 = 0;
        let mut desired_sum: u64 = 0;
        let mut gap_sum: i64 = 0;
        let mut gap_count: usize = 0;

        for entry in entries {
            metrics.total += 1;
            match entry.progress {
                ProgressState::NotStarted => metrics.not_started += 1,
                ProgressState::InProgress => metrics.in_progress += 1,
                ProgressState::Complete => metrics.complete += 1,
            }

            if entry.snapshot.current_is_na {
                metrics.current_na += 1;
            }
            if let Some(current) = entry.snapshot.current_maturity {
                metrics.rated_current += 1;
                current_sum += u64::from(current.value());
            }
            if let Some(desired) = entry.snapshot.desired_maturity {
                metrics.rated_desired += 1;
                desired_sum += u64::from(desired.value());
            }
            if let (Some(current), Some(desired)) =
                (entry.snapshot.current_maturity, entry.snapshot.desired_maturity)
            {
                gap_count += 1;
                gap_sum += i64::from(desired.value()) - i64::from(current.value());
            }
        }

        if metrics.rated_current > 0 {
            metrics.average_current_centi =
                Some(current_sum * 100 / metrics.rated_current as u64);
        }
        if metrics.rated_desired > 0 {
            metrics.average_desired_centi =
                Some(desired_sum * 100 / metrics.rated_desired as u64);
        }
        if gap_count > 0 {
            metrics.average_gap_centi = Some(gap_sum * 100 / gap_count as i64);
        }
        if metrics.total > 0 {
            metrics.completion_percent =
                ((metrics.complete as u64 * 100) / metrics.total as u64).min(100) as u8;
        }

        metrics
    }
}

// =============================================================================
// TESTS
// =============================================================================
