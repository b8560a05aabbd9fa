use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn flip(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Label used inside the commitment encoding.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = crate::error::CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(crate::error::CoachError::InvalidDirection(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Confirmed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Confirmed => "confirmed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// FeedbackKey
// ---------------------------------------------------------------------------

/// Composite key of the feedback table: did the user agree with the
/// reference analysis, and did the user call the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKey {
    AgreeCorrect,
    AgreeIncorrect,
    DisagreeCorrect,
    DisagreeIncorrect,
}

impl FeedbackKey {
    pub fn all() -> &'static [FeedbackKey] {
        &[
            FeedbackKey::AgreeCorrect,
            FeedbackKey::AgreeIncorrect,
            FeedbackKey::DisagreeCorrect,
            FeedbackKey::DisagreeIncorrect,
        ]
    }

    pub fn new(agreed: bool, correct: bool) -> Self {
        match (agreed, correct) {
            (true, true) => FeedbackKey::AgreeCorrect,
            (true, false) => FeedbackKey::AgreeIncorrect,
            (false, true) => FeedbackKey::DisagreeCorrect,
            (false, false) => FeedbackKey::DisagreeIncorrect,
        }
    }

    pub fn agreed(self) -> bool {
        matches!(self, FeedbackKey::AgreeCorrect | FeedbackKey::AgreeIncorrect)
    }

    pub fn correct(self) -> bool {
        matches!(self, FeedbackKey::AgreeCorrect | FeedbackKey::DisagreeCorrect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackKey::AgreeCorrect => "agree_correct",
            FeedbackKey::AgreeIncorrect => "agree_incorrect",
            FeedbackKey::DisagreeCorrect => "disagree_correct",
            FeedbackKey::DisagreeIncorrect => "disagree_incorrect",
        }
    }
}

impl fmt::Display for FeedbackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
