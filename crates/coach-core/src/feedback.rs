//! Coaching feedback: the fixed 2x2 table keyed by whether the user agreed
//! with the reference analysis and whether the call matched the outcome.
//!
//! The table is static data; resolving feedback is a pure lookup.

use crate::types::{Direction, FeedbackKey};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub key: FeedbackKey,
    pub title: &'static str,
    pub message: &'static str,
    pub takeaway: &'static str,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

static TABLE: [Feedback; 4] = [
    Feedback {
        key: FeedbackKey::AgreeCorrect,
        title: "Aligned and right",
        message: "You sided with the analysis and the market moved your way. \
                  The signals lined up with your own read this time.",
        takeaway: "Agreement is not a strategy on its own. Note which signal convinced you.",
    },
    Feedback {
        key: FeedbackKey::AgreeIncorrect,
        title: "Aligned, but wrong",
        message: "You followed the analysis and the market went the other way. \
                  High-confidence signals still miss.",
        takeaway: "Ask what would have made you doubt the call before locking in.",
    },
    Feedback {
        key: FeedbackKey::DisagreeCorrect,
        title: "Independent and right",
        message: "You went against the analysis and called it. \
                  Your own read beat the model this round.",
        takeaway: "Write down why you disagreed so you can tell skill from luck later.",
    },
    Feedback {
        key: FeedbackKey::DisagreeIncorrect,
        title: "Independent, but wrong",
        message: "You went against the analysis and the market followed the model. \
                  Contrarian calls need a stronger reason than a hunch.",
        takeaway: "Compare your reasoning with the listed signals before the next round.",
    },
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fixed payload for `key`.
pub fn lookup(key: FeedbackKey) -> &'static Feedback {
    // TABLE is ordered the same as `FeedbackKey::all()`.
    match key {
        FeedbackKey::AgreeCorrect => &TABLE[0],
        FeedbackKey::AgreeIncorrect => &TABLE[1],
        FeedbackKey::DisagreeCorrect => &TABLE[2],
        FeedbackKey::DisagreeIncorrect => &TABLE[3],
    }
}

/// Classify a finished round. `None` until a direction was chosen and the
/// outcome has been revealed.
pub fn classify(
    revealed: bool,
    user: Option<Direction>,
    reference: Direction,
    outcome: Direction,
) -> Option<FeedbackKey> {
    if !revealed {
        return None;
    }
    let user = user?;
    Some(FeedbackKey::new(user == reference, user == outcome))
}

pub fn resolve(
    revealed: bool,
    user: Option<Direction>,
    reference: Direction,
    outcome: Direction,
) -> Option<&'static Feedback> {
    classify(revealed, user, reference, outcome).map(lookup)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use Direction::{Down, Up};

    #[test]
    fn table_order_matches_keys() {
        for key in FeedbackKey::all() {
            assert_eq!(lookup(*key).key, *key);
        }
    }

    #[test]
    fn payloads_are_distinct() {
        let titles: HashSet<_> = FeedbackKey::all().iter().map(|k| lookup(*k).title).collect();
        let messages: HashSet<_> = FeedbackKey::all()
            .iter()
            .map(|k| lookup(*k).message)
            .collect();
        assert_eq!(titles.len(), 4);
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn nothing_before_reveal() {
        assert!(resolve(false, Some(Up), Up, Up).is_none());
    }

    #[test]
    fn nothing_without_direction() {
        assert!(resolve(true, None, Up, Up).is_none());
    }

    #[test]
    fn agree_correct() {
        assert_eq!(classify(true, Some(Up), Up, Up), Some(FeedbackKey::AgreeCorrect));
    }

    #[test]
    fn disagree_correct() {
        assert_eq!(
            classify(true, Some(Down), Up, Down),
            Some(FeedbackKey::DisagreeCorrect)
        );
    }

    #[test]
    fn agree_incorrect() {
        assert_eq!(
            classify(true, Some(Up), Up, Down),
            Some(FeedbackKey::AgreeIncorrect)
        );
    }

    #[test]
    fn disagree_incorrect() {
        assert_eq!(
            classify(true, Some(Up), Down, Down),
            Some(FeedbackKey::DisagreeIncorrect)
        );
    }

    #[test]
    fn serializes_key_as_snake_case() {
        let json = serde_json::to_value(lookup(FeedbackKey::AgreeIncorrect)).unwrap();
        assert_eq!(json["key"], "agree_incorrect");
        assert!(json["takeaway"].is_string());
    }
}
