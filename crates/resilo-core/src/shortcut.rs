//! # Keyboard Shortcuts
//!
//! Translation of single keystrokes into rating actions for rapid
//! entry. Plain keys act on the current rating, shift-modified keys on
//! the desired rating; `n` marks N/A and digits pick a level.
//!
//! The mapping checks only the fixed 1–5 digit range. Callers using a
//! different scale must re-check the looked-up level against their
//! [`RatingScale`](crate::RatingScale) before applying the action.

use crate::Level;
use serde::{Deserialize, Serialize};

/// Which of the two ratings a shortcut acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingTarget {
    /// The assessed present-state rating.
    Current,
    /// The target rating.
    Desired,
}

/// A decoded rating action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutAction {
    /// The rating the action applies to.
    pub target: RatingTarget,
    /// The selected level, `None` for N/A actions.
    pub value: Option<Level>,
    /// Whether the action marks the rating N/A.
    pub is_na: bool,
}

/// Map a single keystroke to a rating action.
///
/// - `n`/`N` → mark N/A
/// - `1`–`5` → select that level
/// - anything else → `None`
///
/// The shift modifier redirects the action from current to desired.
/// Never panics on a stray key.
#[must_use]
pub fn map_shortcut(key: char, shift: bool) -> Option<ShortcutAction> {
    let target = if shift {
        RatingTarget::Desired
    } else {
        RatingTarget::Current
    };

    match key {
        'n' | 'N' => Some(ShortcutAction {
            target,
            value: None,
            is_na: true,
        }),
        '1'..='5' => {
            let digit = key.to_digit(10)? as u8;
            Some(ShortcutAction {
                target,
                value: Some(Level(digit)),
                is_na: false,
            })
        }
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_maps_to_current_level() {
        let action = map_shortcut('3', false).expect("mapped");
        assert_eq!(action.target, RatingTarget::Current);
        assert_eq!(action.value, Some(Level(3)));
        assert!(!action.is_na);
    }

    #[test]
    fn shifted_digit_targets_desired() {
        let action = map_shortcut('5', true).expect("mapped");
        assert_eq!(action.target, RatingTarget::Desired);
        assert_eq!(action.value, Some(Level(5)));
    }

    #[test]
    fn n_is_case_insensitive() {
        for key in ['n', 'N'] {
            let action = map_shortcut(key, false).expect("mapped");
            assert!(action.is_na);
            assert_eq!(action.value, None);
            assert_eq!(action.target, RatingTarget::Current);
        }
    }

    #[test]
    fn shifted_n_targets_desired() {
        let action = map_shortcut('N', true).expect("mapped");
        assert_eq!(action.target, RatingTarget::Desired);
        assert!(action.is_na);
    }

    #[test]
    fn unmapped_keys_return_none() {
        for key in ['x', '0', '6', '9', ' ', 'q', '\n'] {
            assert_eq!(map_shortcut(key, false), None);
            assert_eq!(map_shortcut(key, true), None);
        }
    }
}
