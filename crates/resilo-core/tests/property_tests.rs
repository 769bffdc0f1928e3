//! # Property-Based Tests
//!
//! The rule engine must uphold its invariants for ANY input snapshot,
//! including ones that already violate them (the engine is also the
//! repair path for interactive callers). These tests throw arbitrary
//! snapshots at every operation.

use proptest::option;
use proptest::prelude::*;
use resilo_core::{Level, RatingRules, RatingScale, TopicRatingSnapshot, validate_submission};

/// Arbitrary snapshot: fields are generated independently, so invariant
/// violations (e.g. N/A with a level set) are deliberately possible.
fn arb_snapshot() -> impl Strategy<Value = TopicRatingSnapshot> {
    (
        option::of(1u8..=5),
        any::<bool>(),
        option::of(1u8..=5),
        any::<bool>(),
        ".{0,20}",
        proptest::collection::vec("[a-z]{1,12}", 0..4),
    )
        .prop_map(
            |(current, current_is_na, desired, desired_is_na, comment, evidence_links)| {
                TopicRatingSnapshot {
                    current_maturity: current.map(Level::new),
                    current_is_na,
                    desired_maturity: desired.map(Level::new),
                    desired_is_na,
                    comment,
                    evidence_links,
                }
            },
        )
}

fn rules() -> RatingRules {
    RatingRules::new(RatingScale::default())
}

proptest! {
    /// After any current-level selection, a set desired never sits below
    /// current.
    #[test]
    fn current_selection_keeps_desired_floor(
        snapshot in arb_snapshot(),
        next in 1u8..=5,
    ) {
        let result = rules().apply_current_selection(&snapshot, Some(Level(next)), false);

        prop_assert_eq!(result.current_maturity, Some(Level(next)));
        prop_assert!(!result.current_is_na);
        if let Some(desired) = result.desired_maturity {
            prop_assert!(!result.desired_is_na);
            prop_assert!(desired >= Level(next));
        }
    }

    /// Marking current N/A always cascades desired to N/A, from any
    /// starting state.
    #[test]
    fn current_na_always_cascades(snapshot in arb_snapshot()) {
        let result = rules().apply_current_selection(&snapshot, None, true);

        prop_assert!(result.current_is_na);
        prop_assert!(result.desired_is_na);
        prop_assert_eq!(result.current_maturity, None);
        prop_assert_eq!(result.desired_maturity, None);
    }

    /// A desired selection below the set current is clamped up to it.
    #[test]
    fn desired_clamped_to_current(
        snapshot in arb_snapshot(),
        current in 2u8..=5,
        below in 1u8..=4,
    ) {
        prop_assume!(below < current);
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(current)),
            current_is_na: false,
            ..snapshot
        };

        let result = rules().apply_desired_selection(&start, Some(Level(below)), false);

        prop_assert_eq!(result.desired_maturity, Some(Level(current)));
        prop_assert!(!result.desired_is_na);
    }

    /// A desired N/A request is a strict no-op while current is rated
    /// (treat-NA-as-zero disabled).
    #[test]
    fn desired_na_is_noop_without_current_na(snapshot in arb_snapshot()) {
        prop_assume!(!snapshot.current_is_na);

        let result = rules().apply_desired_selection(&snapshot, None, true);

        prop_assert_eq!(result, snapshot);
    }

    /// With treat-NA-as-zero enabled, desired N/A succeeds from any
    /// state, and the full scale stays selectable under an N/A current.
    #[test]
    fn na_as_zero_overrides_gating(snapshot in arb_snapshot()) {
        let rules = RatingRules::with_policy(RatingScale::default(), true);

        let result = rules.apply_desired_selection(&snapshot, None, true);
        prop_assert!(result.desired_is_na);
        prop_assert_eq!(result.desired_maturity, None);

        let na_current = TopicRatingSnapshot {
            current_is_na: true,
            current_maturity: None,
            ..snapshot
        };
        prop_assert_eq!(rules.allowed_desired_levels(&na_current).len(), 5);
    }

    /// Whatever the starting state, a selection round through the engine
    /// produces a snapshot the write path accepts.
    #[test]
    fn engine_output_passes_submission_validation(
        snapshot in arb_snapshot(),
        next in option::of(1u8..=5),
        is_na in any::<bool>(),
        desired_next in option::of(1u8..=5),
        desired_is_na in any::<bool>(),
    ) {
        let rules = rules();
        let after_current =
            rules.apply_current_selection(&snapshot, next.map(Level::new), is_na);
        let after_desired = rules.apply_desired_selection(
            &after_current,
            desired_next.map(Level::new),
            desired_is_na,
        );

        prop_assert!(validate_submission(&after_desired, &rules).is_ok());
    }

    /// Allowed desired levels are exactly the levels a desired selection
    /// can land on (from a consistent rated state).
    #[test]
    fn allowed_levels_match_selection_outcomes(
        current in 1u8..=5,
        attempt in 1u8..=5,
    ) {
        let rules = rules();
        let start = TopicRatingSnapshot {
            current_maturity: Some(Level(current)),
            ..TopicRatingSnapshot::new()
        };

        let allowed = rules.allowed_desired_levels(&start);
        let result = rules.apply_desired_selection(&start, Some(Level(attempt)), false);
        let landed = result.desired_maturity.expect("desired set");

        // The landing spot is always an allowed level; an allowed
        // attempt lands exactly where it aimed.
        prop_assert!(allowed.contains(&landed));
        if allowed.contains(&Level(attempt)) {
            prop_assert_eq!(landed, Level(attempt));
        }
    }
}
