pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use coach_core::Session;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(session: Session) -> Router {
    let app_state = state::AppState::new(session);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Session
        .route("/api/session", get(routes::session::get_session))
        .route(
            "/api/session/direction",
            post(routes::session::choose_direction),
        )
        .route(
            "/api/session/confidence",
            post(routes::session::set_confidence),
        )
        .route("/api/session/lock", post(routes::session::lock_in))
        .route(
            "/api/session/outcome/toggle",
            post(routes::session::toggle_outcome),
        )
        .route("/api/session/mode", post(routes::session::set_mode))
        .route(
            "/api/session/wallet/connect",
            post(routes::session::connect_wallet),
        )
        .route(
            "/api/session/wallet/disconnect",
            post(routes::session::disconnect_wallet),
        )
        .route("/api/session/submit", post(routes::session::submit))
        .route("/api/session/reset", post(routes::session::reset))
        // Config
        .route("/api/config", get(routes::config::get_config))
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the UI server on a pre-bound listener.
///
/// The caller binds first so it can report the actual port when `port = 0`
/// lets the OS pick one.
pub async fn serve_on(
    session: Session,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(session);

    tracing::info!("coach UI server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
