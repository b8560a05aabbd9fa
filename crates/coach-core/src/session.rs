//! Session controller.
//!
//! A `Session` owns one `Round` plus everything that moves it forward on its
//! own: the once-per-second countdown, the delayed outcome reveal, and the
//! delayed submission confirmation. All three are tokio tasks owned by the
//! session; they hold only a weak reference back to it, so dropping the last
//! `Session` clone tears them down.
//!
//! Every scheduled task is stamped with the round generation it belongs to.
//! `reset()` bumps the generation and aborts the tasks, so a callback that
//! was already in flight cannot touch the fresh round.

use crate::analysis::Analysis;
use crate::commitment::{self, Commitment, DEMO_ACTOR};
use crate::config::{ChainConfig, Config};
use crate::error::{CoachError, Result};
use crate::feedback::Feedback;
use crate::round::{Countdown, Decision, Round, RoundDefaults, Submission, Tick};
use crate::types::{Direction, SubmissionStatus};
use crate::wallet::{self, ContractWriter, SimulatedWriter};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    Tick { remaining: u32 },
    Expired,
    Locked { auto: bool },
    Revealed { outcome: Direction },
    OutcomeToggled { outcome: Direction },
    Commitment { digest: String },
    Submission {
        status: SubmissionStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        tx_hash: Option<String>,
    },
    Reset,
    /// Any other user-driven change (direction, confidence, mode, wallet).
    Changed,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Tick { .. } => "tick",
            SessionEvent::Expired => "expired",
            SessionEvent::Locked { .. } => "locked",
            SessionEvent::Revealed { .. } => "revealed",
            SessionEvent::OutcomeToggled { .. } => "outcome_toggled",
            SessionEvent::Commitment { .. } => "commitment",
            SessionEvent::Submission { .. } => "submission",
            SessionEvent::Reset => "reset",
            SessionEvent::Changed => "changed",
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeView {
    /// Hidden until revealed, except in demo mode where it can be toggled.
    pub direction: Option<Direction>,
    pub revealed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub demo_mode: bool,
    pub wallet: Option<String>,
    pub analysis: Analysis,
    pub decision: Decision,
    pub countdown: Countdown,
    pub outcome: OutcomeView,
    pub feedback: Option<Feedback>,
    pub commitment: Option<Commitment>,
    pub submission: Submission,
    pub explorer_url: Option<String>,
    pub chain: ChainConfig,
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct Inner {
    round: Round,
    demo_mode: bool,
    wallet: Option<String>,
    generation: u64,
    countdown: Option<JoinHandle<()>>,
    reveal: Option<JoinHandle<()>>,
    submission: Option<JoinHandle<()>>,
}

impl Inner {
    fn abort_tasks(&mut self) {
        for handle in [
            self.countdown.take(),
            self.reveal.take(),
            self.submission.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }

    fn actor(&self) -> &str {
        if self.demo_mode {
            DEMO_ACTOR
        } else {
            self.wallet.as_deref().unwrap_or_default()
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

struct Shared {
    config: Config,
    writer: Arc<dyn ContractWriter>,
    events: broadcast::Sender<SessionEvent>,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Recompute the commitment if the round has one to compute. A
    /// commitment that is being (or has been) submitted is left alone.
    fn refresh_commitment(&self, inner: &mut Inner) -> Option<String> {
        if inner.round.submission.status != SubmissionStatus::Idle {
            return None;
        }
        let timestamp = chrono::Utc::now().timestamp();
        let inputs = inner.round.commitment_inputs(
            inner.actor(),
            &self.config.analysis,
            timestamp,
        )?;
        let built = commitment::build(inputs);
        let digest = built.digest.clone();
        inner.round.commitment = Some(built);
        tracing::debug!(%digest, "commitment updated");
        Some(digest)
    }
}

fn spawn<F>(fut: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Sync callers (unit tests, tooling) have no runtime; nothing is scheduled.
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(fut)),
        Err(_) => {
            tracing::warn!("no tokio runtime: scheduled session task skipped");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One player's round, shared between request handlers.
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// New session using the simulated contract writer.
    pub fn new(config: Config) -> Self {
        let writer = Arc::new(SimulatedWriter::new(config.confirm_delay()));
        Self::with_writer(config, writer)
    }

    pub fn with_writer(config: Config, writer: Arc<dyn ContractWriter>) -> Self {
        let (events, _) = broadcast::channel(64);
        let inner = Inner {
            round: Round::new(RoundDefaults::from(&config)),
            demo_mode: config.demo_mode,
            wallet: None,
            generation: 0,
            countdown: None,
            reveal: None,
            submission: None,
        };
        let session = Self {
            shared: Arc::new(Shared {
                config,
                writer,
                events,
                inner: Mutex::new(inner),
            }),
        };
        {
            let mut inner = session.shared.lock();
            session.start_countdown(&mut inner);
        }
        session
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.shared.lock();
        let round = &inner.round;
        let config = &self.shared.config;
        let show_outcome = round.outcome.revealed || inner.demo_mode;
        SessionSnapshot {
            demo_mode: inner.demo_mode,
            wallet: inner.wallet.clone(),
            analysis: config.analysis.clone(),
            decision: round.decision.clone(),
            countdown: round.countdown.clone(),
            outcome: OutcomeView {
                direction: show_outcome.then_some(round.outcome.direction),
                revealed: round.outcome.revealed,
            },
            feedback: round.feedback(&config.analysis).cloned(),
            commitment: round.commitment.clone(),
            submission: round.submission.clone(),
            explorer_url: round
                .submission
                .tx_hash
                .as_deref()
                .map(|tx| config.chain.tx_url(tx)),
            chain: config.chain.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Decision
    // -----------------------------------------------------------------------

    pub fn choose_direction(&self, direction: Direction) -> Result<()> {
        let mut inner = self.shared.lock();
        inner.round.choose_direction(direction)?;
        tracing::debug!(%direction, "direction chosen");
        self.shared.emit(SessionEvent::Changed);
        Ok(())
    }

    pub fn set_confidence(&self, value: i64) -> Result<u8> {
        let mut inner = self.shared.lock();
        let stored = inner.round.set_confidence(value)?;
        self.shared.emit(SessionEvent::Changed);
        Ok(stored)
    }

    /// Lock the decision and schedule the reveal. `Ok(false)` if the
    /// decision was already locked; nothing is rescheduled in that case.
    pub fn lock_in(&self) -> Result<bool> {
        let mut inner = self.shared.lock();
        if !inner.round.lock_in()? {
            return Ok(false);
        }
        if let Some(handle) = inner.countdown.take() {
            handle.abort();
        }
        self.schedule_reveal(&mut inner);
        tracing::info!("decision locked");
        self.shared.emit(SessionEvent::Locked { auto: false });
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Outcome / mode / wallet
    // -----------------------------------------------------------------------

    /// Demo mode only, and only until a submission starts.
    pub fn toggle_outcome(&self) -> Result<Direction> {
        let mut inner = self.shared.lock();
        if !inner.demo_mode {
            return Err(CoachError::NotDemoMode);
        }
        let outcome = inner.round.toggle_outcome()?;
        let digest = self.shared.refresh_commitment(&mut inner);
        tracing::info!(%outcome, "outcome toggled");
        self.shared.emit(SessionEvent::OutcomeToggled { outcome });
        if let Some(digest) = digest {
            self.shared.emit(SessionEvent::Commitment { digest });
        }
        Ok(outcome)
    }

    /// Switch between demo and live mode. Refused once a submission started,
    /// since the commitment actor depends on the mode.
    pub fn set_demo_mode(&self, demo: bool) -> Result<()> {
        let mut inner = self.shared.lock();
        inner.round.ensure_submission_idle()?;
        if inner.demo_mode == demo {
            return Ok(());
        }
        inner.demo_mode = demo;
        let digest = self.shared.refresh_commitment(&mut inner);
        tracing::info!(demo, "mode changed");
        self.shared.emit(SessionEvent::Changed);
        if let Some(digest) = digest {
            self.shared.emit(SessionEvent::Commitment { digest });
        }
        Ok(())
    }

    /// Simulated wallet connection: assigns a random address.
    pub fn connect_wallet(&self) -> String {
        let address = wallet::random_address();
        tracing::info!(%address, "wallet connected");
        self.set_wallet(Some(address.clone()));
        address
    }

    pub fn disconnect_wallet(&self) {
        tracing::info!("wallet disconnected");
        self.set_wallet(None);
    }

    fn set_wallet(&self, wallet: Option<String>) {
        let mut inner = self.shared.lock();
        inner.wallet = wallet;
        let digest = if inner.demo_mode {
            None
        } else {
            self.shared.refresh_commitment(&mut inner)
        };
        self.shared.emit(SessionEvent::Changed);
        if let Some(digest) = digest {
            self.shared.emit(SessionEvent::Commitment { digest });
        }
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Idle → Pending, then Confirmed once the write lands. In live mode a
    /// failed write drops back to Idle.
    pub fn submit(&self) -> Result<()> {
        let mut inner = self.shared.lock();
        let demo = inner.demo_mode;
        if !demo && inner.wallet.is_none() {
            return Err(CoachError::WalletNotConnected);
        }
        let commitment = inner.round.begin_submission()?;
        let correct = inner.round.is_correct().unwrap_or(false);
        let job = SubmitJob {
            weak: Arc::downgrade(&self.shared),
            generation: inner.generation,
            commitment: commitment.bytes(),
            correct,
            demo,
            delay: self.shared.config.confirm_delay(),
            writer: Arc::clone(&self.shared.writer),
        };
        inner.submission = spawn(job.run());
        tracing::info!(digest = %commitment.digest, demo, "submission pending");
        self.shared.emit(SessionEvent::Submission {
            status: SubmissionStatus::Pending,
            tx_hash: None,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Start a fresh round. Mode and wallet carry over.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.abort_tasks();
        inner.generation += 1;
        inner.round.reset();
        self.start_countdown(&mut inner);
        tracing::info!("round reset");
        self.shared.emit(SessionEvent::Reset);
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    fn start_countdown(&self, inner: &mut Inner) {
        if !inner.round.countdown.running {
            return;
        }
        let weak = Arc::downgrade(&self.shared);
        inner.countdown = spawn(run_countdown(weak, inner.generation));
    }

    fn schedule_reveal(&self, inner: &mut Inner) {
        let weak = Arc::downgrade(&self.shared);
        let delay = self.shared.config.reveal_delay();
        inner.reveal = spawn(run_reveal(weak, inner.generation, delay));
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn run_countdown(weak: Weak<Shared>, generation: u64) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
    loop {
        ticker.tick().await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.lock();
        if inner.generation != generation {
            return;
        }
        match inner.round.tick() {
            Tick::Running(remaining) => {
                tracing::debug!(remaining, "tick");
                shared.emit(SessionEvent::Tick { remaining });
            }
            Tick::AutoLocked => {
                // This task is the countdown; detach rather than abort itself.
                inner.countdown = None;
                let delay = shared.config.reveal_delay();
                inner.reveal = spawn(run_reveal(weak.clone(), generation, delay));
                tracing::info!("countdown elapsed, decision auto-locked");
                shared.emit(SessionEvent::Tick { remaining: 0 });
                shared.emit(SessionEvent::Locked { auto: true });
                return;
            }
            Tick::Expired => {
                tracing::info!("countdown elapsed with no direction chosen");
                shared.emit(SessionEvent::Tick { remaining: 0 });
                shared.emit(SessionEvent::Expired);
                return;
            }
            Tick::Stopped => return,
        }
    }
}

async fn run_reveal(weak: Weak<Shared>, generation: u64, delay: Duration) {
    tokio::time::sleep(delay).await;
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = shared.lock();
    if inner.generation != generation || !inner.round.reveal() {
        return;
    }
    inner.reveal = None;
    let outcome = inner.round.outcome.direction;
    let digest = shared.refresh_commitment(&mut inner);
    tracing::info!(%outcome, "outcome revealed");
    shared.emit(SessionEvent::Revealed { outcome });
    if let Some(digest) = digest {
        shared.emit(SessionEvent::Commitment { digest });
    }
}

struct SubmitJob {
    weak: Weak<Shared>,
    generation: u64,
    commitment: [u8; commitment::DIGEST_LEN],
    correct: bool,
    demo: bool,
    delay: Duration,
    writer: Arc<dyn ContractWriter>,
}

impl SubmitJob {
    async fn run(self) {
        let result = if self.demo {
            tokio::time::sleep(self.delay).await;
            Ok(wallet::random_tx_hash())
        } else {
            self.writer
                .write_commitment(self.commitment, self.correct)
                .await
        };

        let Some(shared) = self.weak.upgrade() else {
            return;
        };
        let mut inner = shared.lock();
        if inner.generation != self.generation {
            return;
        }
        inner.submission = None;
        match result {
            Ok(tx_hash) => {
                if !inner.round.confirm_submission(tx_hash.clone()) {
                    return;
                }
                tracing::info!(%tx_hash, "submission confirmed");
                shared.emit(SessionEvent::Submission {
                    status: SubmissionStatus::Confirmed,
                    tx_hash: Some(tx_hash),
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "contract write failed, submission reverted");
                if !inner.round.abort_submission() {
                    return;
                }
                shared.emit(SessionEvent::Submission {
                    status: SubmissionStatus::Idle,
                    tx_hash: None,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
