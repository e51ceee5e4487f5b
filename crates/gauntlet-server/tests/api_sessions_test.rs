//! End-to-end tests for the session lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    get, memory_pool_with, post_json, say, scenario_body, start_session, test_app, test_app_on,
    test_app_with,
};
use gauntlet_db::DbRuntimeSettings;
use gauntlet_server::config::Config;
use serde_json::json;

#[tokio::test]
async fn health_reports_active_sessions() {
    let (app, _pool) = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["activeSessions"], 0);

    start_session(&app, 0.5).await;
    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["activeSessions"], 1);
}

#[tokio::test]
async fn personas_lists_full_catalogue() {
    let (app, _pool) = test_app();
    let (status, body) = get(&app, "/api/personas").await;
    assert_eq!(status, StatusCode::OK);
    let personas = body["personas"].as_array().unwrap();
    assert_eq!(personas.len(), 5);
    assert_eq!(personas[0]["persona"], "ANGRY_CUSTOMER");
    assert!(personas[0]["keyBehaviors"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn create_session_returns_plan_and_pressure() {
    let (app, _pool) = test_app();
    let (status, body) = post_json(&app, "/api/sessions", &scenario_body(0.5)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["sessionId"].as_str().is_some());
    assert_eq!(body["pressure"].as_f64(), Some(0.5));
    assert_eq!(body["band"], "aggressive");
    assert_eq!(body["scenario"]["personaType"], "ELITE_INTERVIEWER");
    assert_eq!(body["questions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn create_session_accepts_legacy_scale_and_defaults_difficulty() {
    let (app, _pool) = test_app();

    let (status, body) = post_json(&app, "/api/sessions", &scenario_body(5.0)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pressure"].as_f64(), Some(1.0));
    assert_eq!(body["band"], "confrontational");

    let mut raw = scenario_body(0.0);
    raw.as_object_mut().unwrap().remove("difficulty");
    let (status, body) = post_json(&app, "/api/sessions", &raw).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pressure"].as_f64(), Some(0.6));
}

#[tokio::test]
async fn invalid_scenario_lists_every_issue() {
    let (app, _pool) = test_app();
    let (status, body) = post_json(
        &app,
        "/api/sessions",
        &json!({ "personaType": "FRIENDLY_NEIGHBOUR", "company": "Acme", "difficulty": 9 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let issues = body["issues"].as_array().unwrap();
    assert!(issues.len() >= 4, "issues: {issues:?}");
    let text: Vec<&str> = issues.iter().filter_map(|i| i.as_str()).collect();
    assert!(text.iter().any(|i| i.contains("invalid persona type")));
    assert!(text.iter().any(|i| i.contains("role")));
    assert!(text.iter().any(|i| i.contains("invalid difficulty")));
}

#[tokio::test]
async fn repeated_vagueness_escalates_pressure() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;

    let (status, first) = say(&app, &id, "Maybe we could look into it.").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["classification"]["isVague"], true);
    assert_eq!(first["utterance"]["ordinal"], 1);
    assert_eq!(first["pressure"].as_f64(), Some(0.5));
    assert!(first.get("event").is_none());

    let (_, second) = say(&app, &id, "I guess it kind of depends.").await;
    assert_eq!(second["pressure"].as_f64(), Some(0.75));
    assert_eq!(second["band"], "confrontational");
    assert_eq!(second["event"]["direction"], "ESCALATED");
    assert_eq!(second["event"]["ordinal"], 2);
}

#[tokio::test]
async fn commitment_is_extracted_from_utterance() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;

    let (status, body) = say(
        &app,
        &id,
        "I will send the revised plan by Friday. Everything else is on track.",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"]["isVague"], false);
    assert_eq!(
        body["classification"]["extractedCommitment"],
        "I will send the revised plan by Friday"
    );
}

#[tokio::test]
async fn session_view_tracks_transcript() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;
    say(&app, &id, "Maybe later.").await;
    say(&app, &id, "Let's talk about the budget instead.").await;

    let (status, view) = get(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "ACTIVE");
    assert_eq!(view["totalExchanges"], 2);
    assert_eq!(view["counters"]["vague"], 1);
    assert_eq!(view["counters"]["deflection"], 1);
    assert_eq!(view["transcript"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn oversized_utterance_rejected() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;
    let text = "a".repeat(gauntlet_server::api_sessions::MAX_UTTERANCE_CHARS + 1);
    let (status, _) = say(&app, &id, &text).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (app, _pool) = test_app();
    let (status, _) = say(&app, "no-such-session", "Hello").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/sessions/no-such-session").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(&app, "/api/sessions/no-such-session/end", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/scorecards/no-such-session").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ending_session_produces_scorecard_and_report() {
    let (app, pool) = test_app();
    let id = start_session(&app, 0.5).await;
    say(&app, &id, "Maybe we could look into it.").await;
    say(&app, &id, "I guess it kind of depends.").await;
    say(&app, &id, "I will ship the fix by Monday.").await;

    let (status, body) = post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let scorecard = &body["scorecard"];
    assert_eq!(scorecard["totalExchanges"], 3);
    assert_eq!(scorecard["counters"]["vague"], 2);
    assert_eq!(scorecard["counters"]["commitment"], 1);
    assert_eq!(scorecard["escalations"], 1);
    assert_eq!(scorecard["startingPressure"].as_f64(), Some(0.5));
    assert_eq!(
        scorecard["commitments"][0],
        "I will ship the fix by Monday"
    );
    assert_eq!(
        scorecard["feedback"]["recommendations"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
    assert!(body["report"]
        .as_str()
        .unwrap()
        .contains("PERFORMANCE SCORECARD"));

    let conn = pool.get().unwrap();
    let status: String = conn
        .query_row(
            "SELECT status FROM sessions WHERE session_id = ?1",
            [&id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(status, "ENDED");
    drop(conn);

    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["activeSessions"], 0);
}

#[tokio::test]
async fn ended_session_rejects_further_activity() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;
    say(&app, &id, "I'll call you tomorrow.").await;

    let (status, _) = post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = say(&app, &id, "One more thing").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, view) = get(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "ENDED");
    assert_eq!(view["totalExchanges"], 1);
    assert_eq!(view["transcript"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_session_scores_neutral() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;
    let (status, body) = post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scorecard"]["totalExchanges"], 0);
    assert_eq!(body["scorecard"]["scores"]["overall"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn stored_scorecard_served_as_json_and_text() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;
    say(&app, &id, "I promise to review the contract by Thursday.").await;
    post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;

    let (status, body) = get(&app, &format!("/api/scorecards/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], id.as_str());
    assert_eq!(body["scorecard"]["totalExchanges"], 1);
    assert_eq!(body["transcript"].as_array().unwrap().len(), 1);

    let (status, body) = get(&app, &format!("/api/scorecards/{id}?format=text")).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("PERFORMANCE SCORECARD"));
    assert!(text.contains("I promise to review the contract by Thursday"));

    let (status, _) = get(&app, &format!("/api/scorecards/{id}?format=pdf")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scorecard_exported_to_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.scorecards.export_dir = Some(dir.path().to_string_lossy().into_owned());
    let (app, _pool) = test_app_with(&config);

    let id = start_session(&app, 0.5).await;
    say(&app, &id, "We will refund the difference by Friday.").await;
    let (status, _) = post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let path = dir.path().join(format!("scorecard_{id}.json"));
    let exported: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).expect("export file should exist")).unwrap();
    assert_eq!(exported["sessionId"], id.as_str());
    assert_eq!(exported["scorecard"]["totalExchanges"], 1);
}

#[tokio::test]
async fn archived_view_keeps_pressure_history() {
    let (app, _pool) = test_app();
    let id = start_session(&app, 0.5).await;
    say(&app, &id, "Maybe we could look into it.").await;
    say(&app, &id, "I guess it kind of depends.").await;
    post_json(&app, &format!("/api/sessions/{id}/end"), &json!({})).await;

    let (status, view) = get(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "ENDED");
    let events = view["pressureEvents"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["direction"], "ESCALATED");
    assert_eq!(events[0]["ordinal"], 2);
    assert_eq!(events[0]["to"].as_f64(), Some(0.75));
}

#[tokio::test]
async fn failed_export_can_be_retried_until_session_ends() {
    let dir = tempfile::tempdir().unwrap();
    let export_dir = dir.path().join("exports");
    std::fs::write(&export_dir, b"occupied").unwrap();
    let mut config = Config::default();
    config.scorecards.export_dir = Some(export_dir.to_string_lossy().into_owned());
    let (app, _pool) = test_app_with(&config);

    let id = start_session(&app, 0.5).await;
    say(&app, &id, "Maybe we could look into it.").await;
    let end_uri = format!("/api/sessions/{id}/end");

    let (status, _) = post_json(&app, &end_uri, &json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Closed to new turns, but still registered for the retry.
    let (status, _) = say(&app, &id, "One more thing").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["activeSessions"], 1);

    // The database row is already written; a retry must not trip over it.
    let (status, _) = post_json(&app, &end_uri, &json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    std::fs::remove_file(&export_dir).unwrap();
    let (status, body) = post_json(&app, &end_uri, &json!({})).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["scorecard"]["totalExchanges"], 1);
    assert!(export_dir.join(format!("scorecard_{id}.json")).exists());

    let (_, view) = get(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(view["status"], "ENDED");
    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["activeSessions"], 0);
    let (_, events) = get(
        &app,
        &format!("/api/events?session_id={id}&event_type=SESSION_ENDED"),
    )
    .await;
    assert_eq!(events["count"], 1);

    let (status, _) = post_json(&app, &end_uri, &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn utterance_left_unapplied_when_database_is_busy() {
    let pool = memory_pool_with(DbRuntimeSettings {
        acquire_timeout_ms: 100,
        ..DbRuntimeSettings::default()
    });
    let app = test_app_on(pool.clone(), &Config::default());
    let id = start_session(&app, 0.5).await;

    let held = pool.get().unwrap();
    let (status, _) = say(&app, &id, "Maybe we could look into it.").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    drop(held);

    let (_, view) = get(&app, &format!("/api/sessions/{id}")).await;
    assert_eq!(view["totalExchanges"], 0);
    assert_eq!(view["counters"]["vague"], 0);

    let (status, body) = say(&app, &id, "Maybe we could look into it.").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["utterance"]["ordinal"], 1);
    assert_eq!(body["pressure"].as_f64(), Some(0.5));
}
