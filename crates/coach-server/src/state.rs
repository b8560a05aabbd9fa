use coach_core::Session;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}
