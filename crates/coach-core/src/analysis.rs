//! The reference analysis shown next to the user's call.
//!
//! It is fixed for the lifetime of a session: nothing in the round mutates
//! it, and it is only compared against the user's direction when resolving
//! feedback.

use crate::types::Direction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub direction: Direction,
    pub confidence: u8,
    #[serde(default)]
    pub signals: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            direction: Direction::Up,
            confidence: 72,
            signals: vec![
                "RSI divergence on the 4h chart".to_string(),
                "Funding rate turned positive".to_string(),
                "Volume spike above 20-day average".to_string(),
            ],
            note: "Momentum favors upside, but the signal is not a guarantee. \
                   Weigh it against your own read."
                .to_string(),
        }
    }
}
