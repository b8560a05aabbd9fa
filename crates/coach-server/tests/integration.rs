use axum::http::StatusCode;
use coach_core::config::Config;
use coach_core::Session;
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn router(f: impl FnOnce(&mut Config)) -> axum::Router {
    let mut config = Config::default();
    f(&mut config);
    coach_server::build_router(Session::new(config))
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    post_json(app, uri, serde_json::json!({})).await
}

async fn play(app: &axum::Router, direction: &str) {
    let (status, _) = post_json(
        app,
        "/api/session/direction",
        serde_json::json!({ "direction": direction }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = post(app, "/api/session/lock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["decision"]["locked"], true);
    tokio::time::sleep(Duration::from_millis(900)).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn fresh_session_snapshot() {
    let app = router(|_| {});
    let (status, json) = get(&app, "/api/session").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["decision"]["direction"], serde_json::Value::Null);
    assert_eq!(json["decision"]["confidence"], 65);
    assert_eq!(json["decision"]["locked"], false);
    assert_eq!(json["countdown"]["remaining"], 30);
    assert_eq!(json["countdown"]["running"], true);
    assert_eq!(json["outcome"]["revealed"], false);
    assert_eq!(json["commitment"], serde_json::Value::Null);
    assert_eq!(json["submission"]["status"], "idle");
    assert_eq!(json["analysis"]["direction"], "up");
    assert_eq!(json["demo_mode"], true);
}

#[tokio::test(start_paused = true)]
async fn agree_correct_round() {
    let app = router(|_| {});
    play(&app, "up").await;

    let (_, json) = get(&app, "/api/session").await;
    assert_eq!(json["outcome"]["revealed"], true);
    assert_eq!(json["outcome"]["direction"], "up");
    assert_eq!(json["feedback"]["key"], "agree_correct");
    let digest = json["commitment"]["digest"].as_str().unwrap();
    assert_eq!(digest.len(), 66);
    assert!(digest.starts_with("0x"));
}

#[tokio::test(start_paused = true)]
async fn disagree_correct_round() {
    let app = router(|_| {});
    let (status, _) = post(&app, "/api/session/outcome/toggle").await;
    assert_eq!(status, StatusCode::OK);
    play(&app, "down").await;

    let (_, json) = get(&app, "/api/session").await;
    assert_eq!(json["outcome"]["direction"], "down");
    assert_eq!(json["feedback"]["key"], "disagree_correct");
}

#[tokio::test(start_paused = true)]
async fn agree_incorrect_after_toggle() {
    let app = router(|_| {});
    play(&app, "up").await;
    let (status, json) = post(&app, "/api/session/outcome/toggle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["feedback"]["key"], "agree_incorrect");
}

#[tokio::test(start_paused = true)]
async fn toggle_outcome_rejected_in_live_mode() {
    let app = router(|c| c.demo_mode = false);
    let (status, json) = post(&app, "/api/session/outcome/toggle").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("demo"));
}

#[tokio::test(start_paused = true)]
async fn live_mode_hides_outcome_until_reveal() {
    let app = router(|c| c.demo_mode = false);
    let (_, json) = get(&app, "/api/session").await;
    assert_eq!(json["outcome"]["direction"], serde_json::Value::Null);
}

#[tokio::test(start_paused = true)]
async fn confidence_locked_after_lock() {
    let app = router(|_| {});
    let (_, json) = post_json(
        &app,
        "/api/session/confidence",
        serde_json::json!({ "value": -20 }),
    )
    .await;
    assert_eq!(json["decision"]["confidence"], 0);

    play(&app, "down").await;
    let (status, _) = post_json(
        &app,
        "/api/session/confidence",
        serde_json::json!({ "value": 50 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(start_paused = true)]
async fn submit_before_reveal_is_rejected() {
    let app = router(|_| {});
    let (status, _) = post(&app, "/api/session/submit").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(start_paused = true)]
async fn demo_submit_then_confirm() {
    let app = router(|_| {});
    play(&app, "up").await;

    let (status, json) = post(&app, "/api/session/submit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["submission"]["status"], "pending");

    let (status, _) = post(&app, "/api/session/submit").await;
    assert_eq!(status, StatusCode::CONFLICT);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    let (_, json) = get(&app, "/api/session").await;
    assert_eq!(json["submission"]["status"], "confirmed");
    let tx = json["submission"]["tx_hash"].as_str().unwrap();
    assert_eq!(tx.len(), 66);
    assert!(json["explorer_url"].as_str().unwrap().ends_with(tx));
}

#[tokio::test(start_paused = true)]
async fn live_submit_requires_wallet() {
    let app = router(|c| c.demo_mode = false);
    play(&app, "up").await;
    let (status, _) = post(&app, "/api/session/submit").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, json) = post(&app, "/api/session/wallet/connect").await;
    let wallet = json["wallet"].as_str().unwrap().to_string();
    assert_eq!(json["commitment"]["inputs"]["actor"], wallet.as_str());

    let (status, _) = post(&app, "/api/session/submit").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn toggle_after_submit_is_conflict() {
    let app = router(|_| {});
    play(&app, "up").await;
    let (status, _) = post(&app, "/api/session/submit").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = post(&app, "/api/session/outcome/toggle").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].is_string());

    let (_, json) = get(&app, "/api/session").await;
    assert_eq!(json["outcome"]["direction"], "up");
    assert_eq!(json["feedback"]["key"], "agree_correct");
}

#[tokio::test(start_paused = true)]
async fn events_stream_relays_session_changes() {
    let app = router(|_| {});
    let req = axum::http::Request::builder()
        .uri("/api/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ct = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(ct.starts_with("text/event-stream"));

    let (status, _) = post_json(
        &app,
        "/api/session/direction",
        serde_json::json!({ "direction": "down" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let data = frame.into_data().unwrap();
    let text = std::str::from_utf8(&data).unwrap();
    assert!(text.contains("event: changed"), "got {text:?}");
    assert!(text.contains(r#"data: {"kind":"changed"}"#), "got {text:?}");
}

#[tokio::test(start_paused = true)]
async fn reset_restores_defaults() {
    let app = router(|_| {});
    play(&app, "down").await;
    post(&app, "/api/session/submit").await;

    let (status, json) = post(&app, "/api/session/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["decision"]["direction"], serde_json::Value::Null);
    assert_eq!(json["decision"]["confidence"], 65);
    assert_eq!(json["decision"]["locked"], false);
    assert_eq!(json["countdown"]["remaining"], 30);
    assert_eq!(json["countdown"]["running"], true);
    assert_eq!(json["outcome"]["revealed"], false);
    assert_eq!(json["commitment"], serde_json::Value::Null);
    assert_eq!(json["submission"]["status"], "idle");
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_sets_warning() {
    let app = router(|c| c.countdown_secs = 2);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let (_, json) = get(&app, "/api/session").await;
    assert_eq!(json["countdown"]["expired"], true);
    assert_eq!(json["countdown"]["running"], false);
    assert_eq!(json["decision"]["locked"], false);
}

#[tokio::test(start_paused = true)]
async fn mode_switch_round_trip() {
    let app = router(|_| {});
    let (status, json) = post_json(
        &app,
        "/api/session/mode",
        serde_json::json!({ "demo": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["demo_mode"], false);
}

#[tokio::test(start_paused = true)]
async fn get_config_includes_chain() {
    let app = router(|_| {});
    let (status, json) = get(&app, "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["chain"]["chain_id"], 11_155_111);
    assert!(json["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_path_serves_ui() {
    let app = router(|_| {});
    let req = axum::http::Request::builder()
        .uri("/")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ct = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(ct.contains("text/html"));
}
