//! # Rating Rules
//!
//! The dual-rating constraint engine. Every selection an assessor makes
//! flows through here, and the HTTP write path re-validates against the
//! same rules, so the two layers cannot disagree about what a legal
//! snapshot looks like.
//!
//! ## Rule Summary
//!
//! | Action | Effect |
//! |--------|--------|
//! | current := N/A | desired forced to N/A too (unconditional cascade) |
//! | current := level | desired bumped up to at least that level |
//! | desired := N/A | only while current is N/A, or with NA-as-zero on |
//! | desired := level | clamped up to the current-maturity floor |
//!
//! Invalid selections never error: the engine returns the snapshot
//! unchanged, matching interactive controls that must stay unblocking
//! on a stray input.

use crate::{Level, ProgressState, RatingScale, TopicRatingSnapshot};

/// The assessment rule engine.
///
/// Owns the configured [`RatingScale`] and the treat-NA-as-zero policy
/// flag. All operations are pure: each call takes a snapshot by
/// reference and returns a fresh one, with no state retained between
/// calls and no I/O anywhere.
#[derive(Debug, Clone)]
pub struct RatingRules {
    scale: RatingScale,
    treat_na_as_zero: bool,
}

impl Default for RatingRules {
    fn default() -> Self {
        Self::new(RatingScale::default())
    }
}

impl RatingRules {
    /// Create rules over a scale with the default policy
    /// (treat-NA-as-zero disabled).
    #[must_use]
    pub fn new(scale: RatingScale) -> Self {
        Self {
            scale,
            treat_na_as_zero: false,
        }
    }

    /// Create rules with an explicit treat-NA-as-zero policy.
    ///
    /// With the flag enabled, a desired target may be set even while
    /// current is marked N/A, treating N/A as the lowest baseline.
    #[must_use]
    pub fn with_policy(scale: RatingScale, treat_na_as_zero: bool) -> Self {
        Self {
            scale,
            treat_na_as_zero,
        }
    }

    /// The configured rating scale.
    #[must_use]
    pub fn scale(&self) -> &RatingScale {
        &self.scale
    }

    /// Whether the treat-NA-as-zero policy is enabled.
    #[must_use]
    pub fn treat_na_as_zero(&self) -> bool {
        self.treat_na_as_zero
    }

    // =========================================================================
    // SELECTION OPERATIONS
    // =========================================================================

    /// Apply a current-maturity selection.
    ///
    /// Marking current N/A always cascades desired to N/A as well: there
    /// is no desired-floor left to preserve once current itself is
    /// unknown, so the cascade is not gated by the NA-as-zero policy.
    ///
    /// Selecting a level keeps desired at or above it: a desired that is
    /// N/A, absent, or numerically below the new current is bumped up to
    /// equal it.
    #[must_use]
    pub fn apply_current_selection(
        &self,
        snapshot: &TopicRatingSnapshot,
        next_value: Option<Level>,
        is_na: bool,
    ) -> TopicRatingSnapshot {
        let mut next = snapshot.clone();

        if is_na {
            next.current_is_na = true;
            next.current_maturity = None;
            next.desired_is_na = true;
            next.desired_maturity = None;
            return next;
        }

        next.current_is_na = false;
        next.current_maturity = next_value;

        let needs_bump = next.desired_is_na
            || next.desired_maturity.is_none()
            || matches!(
                (next_value, next.desired_maturity),
                (Some(current), Some(desired)) if desired < current
            );
        if needs_bump {
            next.desired_maturity = next_value;
            next.desired_is_na = false;
        }

        next
    }

    /// Apply a desired-maturity selection.
    ///
    /// A desired N/A is permitted only while current is N/A, or when the
    /// NA-as-zero policy is enabled; otherwise the call is a silent
    /// no-op. A desired level is likewise a no-op while current is N/A
    /// without the policy. Accepted levels are clamped up to the floor
    /// (current maturity if set, else the lowest scale level), which is
    /// what enforces `desired >= current` from this side.
    #[must_use]
    pub fn apply_desired_selection(
        &self,
        snapshot: &TopicRatingSnapshot,
        next_value: Option<Level>,
        is_na: bool,
    ) -> TopicRatingSnapshot {
        let mut next = snapshot.clone();

        if is_na {
            if snapshot.current_is_na || self.treat_na_as_zero {
                next.desired_is_na = true;
                next.desired_maturity = None;
            }
            return next;
        }

        if snapshot.current_is_na && !self.treat_na_as_zero {
            return next;
        }

        let floor = snapshot.current_maturity.unwrap_or_else(|| self.scale.floor());
        let safe_value = next_value.unwrap_or(floor).max(floor);
        next.desired_maturity = Some(safe_value);
        next.desired_is_na = false;

        next
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The desired levels currently selectable for this snapshot.
    ///
    /// Callers use this to disable invalid desired options before a
    /// selection is even attempted.
    #[must_use]
    pub fn allowed_desired_levels(&self, snapshot: &TopicRatingSnapshot) -> Vec<Level> {
        if snapshot.current_is_na {
            return if self.treat_na_as_zero {
                self.scale.levels().to_vec()
            } else {
                Vec::new()
            };
        }

        match snapshot.current_maturity {
            Some(current) => self.scale.at_or_above(current),
            None => self.scale.levels().to_vec(),
        }
    }

    /// Whether the snapshot is fully resolved.
    ///
    /// Complete means current has *some* determination (a level or N/A)
    /// and desired has been explicitly resolved to match: N/A alongside
    /// an N/A current, or a concrete level.
    #[must_use]
    pub fn is_complete(&self, snapshot: &TopicRatingSnapshot) -> bool {
        (snapshot.current_is_na && snapshot.desired_is_na)
            || (snapshot.current_maturity.is_some()
                && (snapshot.desired_is_na || snapshot.desired_maturity.is_some()))
    }

    /// Derive the progress classification for a snapshot.
    #[must_use]
    pub fn progress_state(&self, snapshot: &TopicRatingSnapshot) -> ProgressState {
        if self.is_complete(snapshot) {
            return ProgressState::Complete;
        }

        let touched = snapshot.current_is_na
            || snapshot.desired_is_na
            || snapshot.current_maturity.is_some()
            || snapshot.desired_maturity.is_some()
            || snapshot.has_notes();

        if touched {
            ProgressState::InProgress
        } else {
            ProgressState::NotStarted
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RatingRules {
        RatingRules::new(RatingScale::default())
    }

    fn na_as_zero_rules() -> RatingRules {
        RatingRules::with_policy(RatingScale::default(), true)
    }

    // -------------------------------------------------------------------------
    // CURRENT SELECTION
    // -------------------------------------------------------------------------

    #[test]
    fn current_na_cascades_to_desired() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(3)),
            desired_maturity: Some(Level(5)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_current_selection(&start, None, true);

        assert!(next.current_is_na);
        assert!(next.desired_is_na);
        assert_eq!(next.current_maturity, None);
        assert_eq!(next.desired_maturity, None);
    }

    #[test]
    fn current_na_cascade_ignores_na_as_zero_policy() {
        let start = TopicRatingSnapshot {
            desired_maturity: Some(Level(4)),
            ..TopicRatingSnapshot::new()
        };

        // Cascade is unconditional even with the policy enabled.
        let next = na_as_zero_rules().apply_current_selection(&start, None, true);

        assert!(next.desired_is_na);
        assert_eq!(next.desired_maturity, None);
    }

    #[test]
    fn selecting_current_bumps_lower_desired() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(1)),
            desired_maturity: Some(Level(2)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_current_selection(&start, Some(Level(4)), false);

        assert_eq!(next.current_maturity, Some(Level(4)));
        assert_eq!(next.desired_maturity, Some(Level(4)));
        assert!(!next.desired_is_na);
    }

    #[test]
    fn selecting_current_leaves_higher_desired_alone() {
        let start = TopicRatingSnapshot {
            desired_maturity: Some(Level(5)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_current_selection(&start, Some(Level(2)), false);

        assert_eq!(next.current_maturity, Some(Level(2)));
        assert_eq!(next.desired_maturity, Some(Level(5)));
    }

    #[test]
    fn selecting_current_resolves_na_desired() {
        let start = TopicRatingSnapshot {
            current_is_na: true,
            desired_is_na: true,
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_current_selection(&start, Some(Level(3)), false);

        assert!(!next.current_is_na);
        assert!(!next.desired_is_na);
        assert_eq!(next.desired_maturity, Some(Level(3)));
    }

    #[test]
    fn clearing_current_keeps_set_desired() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(2)),
            desired_maturity: Some(Level(3)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_current_selection(&start, None, false);

        assert_eq!(next.current_maturity, None);
        assert_eq!(next.desired_maturity, Some(Level(3)));
    }

    // -------------------------------------------------------------------------
    // DESIRED SELECTION
    // -------------------------------------------------------------------------

    #[test]
    fn desired_clamped_to_current_floor() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(3)),
            desired_maturity: Some(Level(3)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_desired_selection(&start, Some(Level(1)), false);

        assert_eq!(next.desired_maturity, Some(Level(3)));
    }

    #[test]
    fn desired_above_current_accepted() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(2)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_desired_selection(&start, Some(Level(5)), false);

        assert_eq!(next.desired_maturity, Some(Level(5)));
        assert!(!next.desired_is_na);
    }

    #[test]
    fn desired_floor_is_scale_floor_without_current() {
        let next = rules().apply_desired_selection(&TopicRatingSnapshot::new(), None, false);
        assert_eq!(next.desired_maturity, Some(Level(1)));
    }

    #[test]
    fn desired_na_rejected_while_current_rated() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(2)),
            desired_maturity: Some(Level(3)),
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_desired_selection(&start, None, true);

        // Silent no-op: the snapshot comes back unchanged.
        assert_eq!(next, start);
    }

    #[test]
    fn desired_na_allowed_with_na_as_zero() {
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(2)),
            desired_maturity: Some(Level(3)),
            ..TopicRatingSnapshot::new()
        };

        let next = na_as_zero_rules().apply_desired_selection(&start, None, true);

        assert!(next.desired_is_na);
        assert_eq!(next.desired_maturity, None);
    }

    #[test]
    fn desired_level_rejected_while_current_na() {
        let start = TopicRatingSnapshot {
            current_is_na: true,
            desired_is_na: true,
            ..TopicRatingSnapshot::new()
        };

        let next = rules().apply_desired_selection(&start, Some(Level(4)), false);

        assert_eq!(next, start);
    }

    #[test]
    fn desired_level_allowed_while_current_na_with_policy() {
        let start = TopicRatingSnapshot {
            current_is_na: true,
            desired_is_na: true,
            ..TopicRatingSnapshot::new()
        };

        let next = na_as_zero_rules().apply_desired_selection(&start, Some(Level(4)), false);

        assert_eq!(next.desired_maturity, Some(Level(4)));
        assert!(!next.desired_is_na);
        // Current stays N/A: only desired is resolved by this action.
        assert!(next.current_is_na);
    }

    // -------------------------------------------------------------------------
    // ALLOWED DESIRED LEVELS
    // -------------------------------------------------------------------------

    #[test]
    fn allowed_levels_empty_while_current_na() {
        let snapshot = TopicRatingSnapshot {
            current_is_na: true,
            desired_is_na: true,
            ..TopicRatingSnapshot::new()
        };
        assert!(rules().allowed_desired_levels(&snapshot).is_empty());
    }

    #[test]
    fn allowed_levels_full_scale_while_current_na_with_policy() {
        let snapshot = TopicRatingSnapshot {
            current_is_na: true,
            desired_is_na: true,
            ..TopicRatingSnapshot::new()
        };
        assert_eq!(na_as_zero_rules().allowed_desired_levels(&snapshot).len(), 5);
    }

    #[test]
    fn allowed_levels_bounded_by_current() {
        let snapshot = TopicRatingSnapshot {
            current_maturity: Some(Level(4)),
            ..TopicRatingSnapshot::new()
        };
        assert_eq!(
            rules().allowed_desired_levels(&snapshot),
            vec![Level(4), Level(5)]
        );
    }

    #[test]
    fn allowed_levels_full_scale_without_current() {
        assert_eq!(
            rules().allowed_desired_levels(&TopicRatingSnapshot::new()).len(),
            5
        );
    }

    // -------------------------------------------------------------------------
    // COMPLETENESS & PROGRESS
    // -------------------------------------------------------------------------

    #[test]
    fn empty_snapshot_not_started() {
        let rules = rules();
        let snapshot = TopicRatingSnapshot::new();
        assert!(!rules.is_complete(&snapshot));
        assert_eq!(rules.progress_state(&snapshot), ProgressState::NotStarted);
    }

    #[test]
    fn both_na_is_complete() {
        let rules = rules();
        let snapshot = TopicRatingSnapshot {
            current_is_na: true,
            desired_is_na: true,
            ..TopicRatingSnapshot::new()
        };
        assert!(rules.is_complete(&snapshot));
        assert_eq!(rules.progress_state(&snapshot), ProgressState::Complete);
    }

    #[test]
    fn current_set_desired_set_is_complete() {
        let rules = rules();
        let snapshot = TopicRatingSnapshot {
            current_maturity: Some(Level(2)),
            desired_maturity: Some(Level(2)),
            ..TopicRatingSnapshot::new()
        };
        assert!(rules.is_complete(&snapshot));
    }

    #[test]
    fn desired_only_is_in_progress() {
        let rules = rules();
        let snapshot = TopicRatingSnapshot {
            desired_maturity: Some(Level(4)),
            ..TopicRatingSnapshot::new()
        };
        assert!(!rules.is_complete(&snapshot));
        assert_eq!(rules.progress_state(&snapshot), ProgressState::InProgress);
    }

    #[test]
    fn comment_alone_is_in_progress() {
        let rules = rules();
        let snapshot = TopicRatingSnapshot {
            comment: "needs a follow-up with the platform team".to_string(),
            ..TopicRatingSnapshot::new()
        };
        assert_eq!(rules.progress_state(&snapshot), ProgressState::InProgress);
    }

    #[test]
    fn blank_comment_stays_not_started() {
        let rules = rules();
        let snapshot = TopicRatingSnapshot {
            comment: "   ".to_string(),
            ..TopicRatingSnapshot::new()
        };
        assert_eq!(rules.progress_state(&snapshot), ProgressState::NotStarted);
    }

    /// Completion can only regress through `apply_current_selection`:
    /// clearing current (level := None) de-resolves the snapshot, and the
    /// N/A cascade re-resolves it as complete-by-N/A. Desired selections
    /// can never regress a complete snapshot: rejected ones are no-ops
    /// and accepted ones leave desired set or N/A.
    #[test]
    fn only_current_selection_regresses_completeness() {
        let rules = rules();
        let complete = rules.apply_current_selection(
            &TopicRatingSnapshot::new(),
            Some(Level(3)),
            false,
        );
        assert!(rules.is_complete(&complete));

        // Desired operations keep it complete.
        let after_desired = rules.apply_desired_selection(&complete, Some(Level(1)), false);
        assert!(rules.is_complete(&after_desired));
        let after_desired_na = rules.apply_desired_selection(&complete, None, true);
        assert!(rules.is_complete(&after_desired_na)); // no-op path

        // Clearing current regresses to in-progress.
        let cleared = rules.apply_current_selection(&complete, None, false);
        assert!(!rules.is_complete(&cleared));
        assert_eq!(rules.progress_state(&cleared), ProgressState::InProgress);
    }
}
