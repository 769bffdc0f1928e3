//! # Rating Scale
//!
//! The ordered set of maturity levels a deployment assesses against.
//!
//! The scale is external configuration: callers supply it, the engine
//! only uses it as a bound. Presentation data (level labels, colors)
//! deliberately lives in the app layer, never here.

use crate::Level;
use serde::{Deserialize, Serialize};

/// An ordered set of integer maturity levels, e.g. `[1, 2, 3, 4, 5]`.
///
/// # Precondition
///
/// The level list must be non-empty and strictly ascending. This is a
/// documented caller obligation, not a runtime-checked error: the engine
/// never validates the scale itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    levels: Vec<Level>,
}

impl RatingScale {
    /// Create a scale from an ascending list of levels.
    #[must_use]
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    /// Create a scale from raw level values.
    #[must_use]
    pub fn from_values(values: &[u8]) -> Self {
        Self {
            levels: values.iter().copied().map(Level::new).collect(),
        }
    }

    /// The lowest level on the scale.
    ///
    /// Used as the desired-rating floor when no current maturity is set.
    #[must_use]
    pub fn floor(&self) -> Level {
        self.levels.first().copied().unwrap_or_default()
    }

    /// Check whether a level is on the scale.
    #[must_use]
    pub fn contains(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// All levels at or above the given bound, in scale order.
    #[must_use]
    pub fn at_or_above(&self, bound: Level) -> Vec<Level> {
        self.levels.iter().copied().filter(|l| *l >= bound).collect()
    }

    /// All levels on the scale, in order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
}

impl Default for RatingScale {
    /// The conventional five-level maturity scale `[1, 2, 3, 4, 5]`.
    fn default() -> Self {
        Self::from_values(&[1, 2, 3, 4, 5])
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_is_one_to_five() {
        let scale = RatingScale::default();
        assert_eq!(scale.levels().len(), 5);
        assert_eq!(scale.floor(), Level(1));
        assert!(scale.contains(Level(5)));
        assert!(!scale.contains(Level(6)));
        assert!(!scale.contains(Level(0)));
    }

    #[test]
    fn at_or_above_filters_in_order() {
        let scale = RatingScale::default();
        assert_eq!(
            scale.at_or_above(Level(3)),
            vec![Level(3), Level(4), Level(5)]
        );
        assert_eq!(scale.at_or_above(Level(1)).len(), 5);
        assert!(scale.at_or_above(Level(6)).is_empty());
    }

    #[test]
    fn custom_scale_floor() {
        let scale = RatingScale::from_values(&[0, 1, 2, 3]);
        assert_eq!(scale.floor(), Level(0));
        assert_eq!(scale.at_or_above(Level(2)), vec![Level(2), Level(3)]);
    }
}
