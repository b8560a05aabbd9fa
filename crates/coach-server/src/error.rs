use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coach_core::error::CoachError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        let Some(e) = self.0.downcast_ref::<CoachError>() else {
            return StatusCode::INTERNAL_SERVER_ERROR;
        };
        match e {
            CoachError::Locked
            | CoachError::AlreadySubmitted
            | CoachError::SubmissionInFlight => StatusCode::CONFLICT,
            CoachError::NoDirection
            | CoachError::NotDemoMode
            | CoachError::NoCommitment
            | CoachError::WalletNotConnected => StatusCode::UNPROCESSABLE_ENTITY,
            CoachError::InvalidDirection(_) => StatusCode::BAD_REQUEST,
            CoachError::Wallet(_) => StatusCode::BAD_GATEWAY,
            CoachError::Encoding(_)
            | CoachError::Io(_)
            | CoachError::Yaml(_)
            | CoachError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
