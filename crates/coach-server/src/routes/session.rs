use axum::extract::State;
use axum::Json;
use coach_core::types::Direction;
use coach_core::SessionSnapshot;

use crate::error::AppError;
use crate::state::AppState;

type SnapshotResult = Result<Json<SessionSnapshot>, AppError>;

/// GET /api/session — current round, analysis, feedback and submission.
pub async fn get_session(State(app): State<AppState>) -> Json<SessionSnapshot> {
    Json(app.session.snapshot())
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct DirectionBody {
    pub direction: String,
}

/// POST /api/session/direction — pick UP or DOWN before locking in.
pub async fn choose_direction(
    State(app): State<AppState>,
    Json(body): Json<DirectionBody>,
) -> SnapshotResult {
    let direction: Direction = body.direction.parse()?;
    app.session.choose_direction(direction)?;
    Ok(Json(app.session.snapshot()))
}

#[derive(serde::Deserialize)]
pub struct ConfidenceBody {
    pub value: i64,
}

/// POST /api/session/confidence — any integer; stored clamped to 0..=100.
pub async fn set_confidence(
    State(app): State<AppState>,
    Json(body): Json<ConfidenceBody>,
) -> SnapshotResult {
    app.session.set_confidence(body.value)?;
    Ok(Json(app.session.snapshot()))
}

/// POST /api/session/lock — lock the decision; the outcome follows shortly.
pub async fn lock_in(State(app): State<AppState>) -> SnapshotResult {
    app.session.lock_in()?;
    Ok(Json(app.session.snapshot()))
}

// ---------------------------------------------------------------------------
// Outcome, mode, wallet
// ---------------------------------------------------------------------------

/// POST /api/session/outcome/toggle — demo mode only.
pub async fn toggle_outcome(State(app): State<AppState>) -> SnapshotResult {
    app.session.toggle_outcome()?;
    Ok(Json(app.session.snapshot()))
}

#[derive(serde::Deserialize)]
pub struct ModeBody {
    pub demo: bool,
}

/// POST /api/session/mode — switch between demo and live.
pub async fn set_mode(State(app): State<AppState>, Json(body): Json<ModeBody>) -> SnapshotResult {
    app.session.set_demo_mode(body.demo)?;
    Ok(Json(app.session.snapshot()))
}

/// POST /api/session/wallet/connect
pub async fn connect_wallet(State(app): State<AppState>) -> Json<SessionSnapshot> {
    app.session.connect_wallet();
    Json(app.session.snapshot())
}

/// POST /api/session/wallet/disconnect
pub async fn disconnect_wallet(State(app): State<AppState>) -> Json<SessionSnapshot> {
    app.session.disconnect_wallet();
    Json(app.session.snapshot())
}

// ---------------------------------------------------------------------------
// Submit / reset
// ---------------------------------------------------------------------------

/// POST /api/session/submit — commit the round digest. Returns immediately
/// with status `pending`; confirmation arrives over `/api/events`.
pub async fn submit(State(app): State<AppState>) -> SnapshotResult {
    app.session.submit()?;
    Ok(Json(app.session.snapshot()))
}

/// POST /api/session/reset — start a new round.
pub async fn reset(State(app): State<AppState>) -> Json<SessionSnapshot> {
    app.session.reset();
    Json(app.session.snapshot())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
