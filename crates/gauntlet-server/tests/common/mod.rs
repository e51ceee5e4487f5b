//! Shared helpers for the server integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gauntlet_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings, MEMORY_PATH};
use gauntlet_server::{app, config::Config, AppState};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

/// In-memory pool; every request shares its single connection.
pub fn memory_pool_with(settings: DbRuntimeSettings) -> DbPool {
    let pool = create_pool(MEMORY_PATH, settings).expect("failed to create pool");
    let conn = pool.get().unwrap();
    run_migrations(&conn).expect("migrations should apply");
    pool
}

pub fn memory_pool() -> DbPool {
    memory_pool_with(DbRuntimeSettings::default())
}

pub fn test_app_on(pool: DbPool, config: &Config) -> Router {
    app(AppState::new(pool, config))
}

pub fn test_app_with(config: &Config) -> (Router, DbPool) {
    let pool = memory_pool();
    (test_app_on(pool.clone(), config), pool)
}

pub fn test_app() -> (Router, DbPool) {
    test_app_with(&Config::default())
}

pub fn scenario_body(difficulty: f64) -> Value {
    json!({
        "personaType": "ELITE_INTERVIEWER",
        "company": "Acme",
        "role": "Staff Engineer",
        "stakes": "Final round",
        "userGoal": "Land the offer",
        "difficulty": difficulty,
    })
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
    )
    .await
}

/// Opens a session and returns its id.
pub async fn start_session(app: &Router, difficulty: f64) -> String {
    let (status, body) = post_json(app, "/api/sessions", &scenario_body(difficulty)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["sessionId"].as_str().unwrap().to_string()
}

pub async fn say(app: &Router, session_id: &str, text: &str) -> (StatusCode, Value) {
    post_json(
        app,
        &format!("/api/sessions/{session_id}/utterances"),
        &json!({ "text": text }),
    )
    .await
}
