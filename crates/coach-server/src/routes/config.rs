use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config — the effective configuration the session runs with,
/// plus any validation warnings.
///
/// Read-only: config is loaded once at startup.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let config = app.session.config();
    let mut json = serde_json::to_value(config)?;
    json["warnings"] = serde_json::to_value(config.validate())?;
    Ok(Json(json))
}
