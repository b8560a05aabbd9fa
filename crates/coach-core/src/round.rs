//! The state of one prediction round.
//!
//! `Round` is the synchronous state machine: it holds the decision, the
//! countdown, the outcome, the commitment and the submission, and enforces
//! every transition rule. It never sleeps or spawns; the `Session`
//! controller drives time and calls into it.

use crate::analysis::Analysis;
use crate::commitment::{Commitment, CommitmentInputs};
use crate::config::Config;
use crate::error::{CoachError, Result};
use crate::feedback::{self, Feedback};
use crate::types::{Direction, SubmissionStatus};
use serde::Serialize;

// ---------------------------------------------------------------------------
// RoundDefaults
// ---------------------------------------------------------------------------

/// Values a round starts from, and returns to on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundDefaults {
    pub countdown_secs: u32,
    pub confidence: u8,
    pub outcome: Direction,
}

impl Default for RoundDefaults {
    fn default() -> Self {
        Self {
            countdown_secs: 30,
            confidence: 65,
            outcome: Direction::Up,
        }
    }
}

impl From<&Config> for RoundDefaults {
    fn from(cfg: &Config) -> Self {
        Self {
            countdown_secs: cfg.countdown_secs,
            confidence: cfg.default_confidence.min(100),
            outcome: cfg.default_outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub direction: Option<Direction>,
    pub confidence: u8,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub remaining: u32,
    pub running: bool,
    /// Set when the countdown hit zero with no direction chosen.
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub direction: Direction,
    pub revealed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// What a countdown tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left.
    Running(u32),
    /// Hit zero with a direction chosen; the decision is now locked.
    AutoLocked,
    /// Hit zero with no direction; the warning flag is set.
    Expired,
    /// The countdown was not running. Nothing changed.
    Stopped,
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    defaults: RoundDefaults,
    pub decision: Decision,
    pub countdown: Countdown,
    pub outcome: Outcome,
    pub commitment: Option<Commitment>,
    pub submission: Submission,
}

impl Round {
    /// Fresh round. A zero-length countdown starts out already expired.
    pub fn new(defaults: RoundDefaults) -> Self {
        let timed = defaults.countdown_secs > 0;
        Self {
            defaults,
            decision: Decision {
                direction: None,
                confidence: defaults.confidence,
                locked: false,
            },
            countdown: Countdown {
                remaining: defaults.countdown_secs,
                running: timed,
                expired: !timed,
            },
            outcome: Outcome {
                direction: defaults.outcome,
                revealed: false,
            },
            commitment: None,
            submission: Submission::default(),
        }
    }

    pub fn defaults(&self) -> RoundDefaults {
        self.defaults
    }

    /// Restore every field to the session defaults.
    pub fn reset(&mut self) {
        *self = Self::new(self.defaults);
    }

    // -----------------------------------------------------------------------
    // Decision
    // -----------------------------------------------------------------------

    fn ensure_unlocked(&self) -> Result<()> {
        if self.decision.locked {
            return Err(CoachError::Locked);
        }
        Ok(())
    }

    pub fn choose_direction(&mut self, direction: Direction) -> Result<()> {
        self.ensure_unlocked()?;
        self.decision.direction = Some(direction);
        self.countdown.expired = false;
        Ok(())
    }

    /// Clamp `value` into 0..=100 and store it. Returns the stored value.
    pub fn set_confidence(&mut self, value: i64) -> Result<u8> {
        self.ensure_unlocked()?;
        let clamped = value.clamp(0, 100) as u8;
        self.decision.confidence = clamped;
        Ok(clamped)
    }

    /// Lock the decision. `Ok(false)` when it was already locked.
    pub fn lock_in(&mut self) -> Result<bool> {
        if self.decision.direction.is_none() {
            return Err(CoachError::NoDirection);
        }
        if self.decision.locked {
            return Ok(false);
        }
        self.decision.locked = true;
        self.countdown.running = false;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Countdown
    // -----------------------------------------------------------------------

    pub fn tick(&mut self) -> Tick {
        if !self.countdown.running || self.decision.locked {
            return Tick::Stopped;
        }
        self.countdown.remaining = self.countdown.remaining.saturating_sub(1);
        if self.countdown.remaining > 0 {
            return Tick::Running(self.countdown.remaining);
        }

        self.countdown.running = false;
        if self.decision.direction.is_some() {
            self.decision.locked = true;
            Tick::AutoLocked
        } else {
            self.countdown.expired = true;
            Tick::Expired
        }
    }

    // -----------------------------------------------------------------------
    // Outcome
    // -----------------------------------------------------------------------

    /// Mark the outcome revealed. Returns false if not locked or already
    /// revealed, so a reveal lands at most once per round.
    pub fn reveal(&mut self) -> bool {
        if !self.decision.locked || self.outcome.revealed {
            return false;
        }
        self.outcome.revealed = true;
        true
    }

    /// Flip the outcome. Frozen once a submission has started, since the
    /// commitment and the `correct` flag were taken from it.
    pub fn toggle_outcome(&mut self) -> Result<Direction> {
        self.ensure_submission_idle()?;
        self.outcome.direction = self.outcome.direction.flip();
        Ok(self.outcome.direction)
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.decision
            .direction
            .map(|d| d == self.outcome.direction)
    }

    pub fn feedback(&self, analysis: &Analysis) -> Option<&'static Feedback> {
        feedback::resolve(
            self.outcome.revealed,
            self.decision.direction,
            analysis.direction,
            self.outcome.direction,
        )
    }

    // -----------------------------------------------------------------------
    // Commitment
    // -----------------------------------------------------------------------

    /// Inputs for the commitment, once the decision is locked and the
    /// outcome revealed.
    pub fn commitment_inputs(
        &self,
        actor: &str,
        analysis: &Analysis,
        timestamp: i64,
    ) -> Option<CommitmentInputs> {
        if !self.decision.locked || !self.outcome.revealed {
            return None;
        }
        Some(CommitmentInputs {
            actor: actor.to_string(),
            analysis_direction: analysis.direction,
            analysis_confidence: analysis.confidence,
            user_direction: self.decision.direction?,
            user_confidence: self.decision.confidence,
            outcome: self.outcome.direction,
            timestamp,
        })
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Errors unless no submission has started this round.
    pub fn ensure_submission_idle(&self) -> Result<()> {
        match self.submission.status {
            SubmissionStatus::Idle => Ok(()),
            SubmissionStatus::Pending => Err(CoachError::SubmissionInFlight),
            SubmissionStatus::Confirmed => Err(CoachError::AlreadySubmitted),
        }
    }

    /// Idle → Pending. Returns the commitment to write.
    pub fn begin_submission(&mut self) -> Result<Commitment> {
        self.ensure_submission_idle()?;
        let commitment = self.commitment.clone().ok_or(CoachError::NoCommitment)?;
        self.submission.status = SubmissionStatus::Pending;
        Ok(commitment)
    }

    /// Pending → Confirmed. Ignored in any other state.
    pub fn confirm_submission(&mut self, tx_hash: String) -> bool {
        if self.submission.status != SubmissionStatus::Pending {
            return false;
        }
        self.submission.status = SubmissionStatus::Confirmed;
        self.submission.tx_hash = Some(tx_hash);
        true
    }

    /// Pending → Idle after a failed write.
    pub fn abort_submission(&mut self) -> bool {
        if self.submission.status != SubmissionStatus::Pending {
            return false;
        }
        self.submission.status = SubmissionStatus::Idle;
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
