//! Session lifecycle handlers.
//!
//! Provides:
//! - `POST /api/sessions`: validate a scenario and open a session
//! - `GET /api/sessions/{session_id}`: current state, or the archived record
//! - `POST /api/sessions/{session_id}/utterances`: classify one utterance
//! - `POST /api/sessions/{session_id}/end`: produce and store the scorecard
//! - `GET /api/scorecards/{session_id}`: a stored scorecard, JSON or text

use crate::api::ApiError;
use crate::{emit_and_broadcast, AppState};
use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use gauntlet_engine::{
    render_report, PressureEvent, Scorecard, SessionCounters, SessionState, TranscriptEntry,
    TurnOutcome,
};
use gauntlet_observe::{
    load_scorecard, load_session, mark_session_ended, record_session, store_all, EventPayload,
    ObserveError, ScorecardRecord, SessionStatus,
};
use gauntlet_scenario::{
    persona_template, question_plan, validate_scenario, PersonaTemplate, RawScenario,
    ScenarioDescriptor,
};
use gauntlet_types::{PressureBand, PressureLevel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest accepted utterance, in characters.
pub const MAX_UTTERANCE_CHARS: usize = 10_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub scenario: ScenarioDescriptor,
    pub pressure: PressureLevel,
    pub band: PressureBand,
    pub persona: PersonaTemplate,
    /// Questions the persona opens with, scaled by difficulty.
    pub questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
    /// Defaults to the time the request is handled.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub status: SessionStatus,
    pub scenario: ScenarioDescriptor,
    pub pressure: PressureLevel,
    pub band: PressureBand,
    pub total_exchanges: u64,
    pub counters: SessionCounters,
    pub pressure_events: Vec<PressureEvent>,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionResponse {
    pub session_id: String,
    pub scorecard: Scorecard,
    pub report: String,
}

#[derive(Debug, Deserialize)]
pub struct ScorecardQuery {
    /// `json` (default) or `text`.
    pub format: Option<String>,
}

fn db_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::InternalServerError(format!("database error: {e}"))
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::InternalServerError(format!("task join error: {e}"))
}

/// Handler for `POST /api/sessions`.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(mut raw): Json<RawScenario>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    if raw.difficulty.is_none() {
        raw.difficulty = Some(state.pressure.default_start);
    }
    let scenario = validate_scenario(&raw)?;
    let session_id = uuid::Uuid::new_v4().to_string();

    let db_state = Arc::clone(&state);
    let db_id = session_id.clone();
    let db_scenario = scenario.clone();
    tokio::task::spawn_blocking(move || {
        let conn = db_state.pool.get().map_err(db_error)?;
        record_session(&conn, &db_id, &db_scenario).map_err(db_error)?;
        emit_and_broadcast(
            &conn,
            &db_id,
            &EventPayload::session_started(&db_scenario),
            &db_state.events_tx,
        );
        Ok::<_, ApiError>(())
    })
    .await
    .map_err(join_error)??;

    let session = SessionState::new(scenario.clone(), state.pressure);
    let pressure = session.level();
    state.sessions.insert(session_id.clone(), session);

    tracing::info!(
        session_id = %session_id,
        persona = scenario.persona_type.as_str(),
        pressure = pressure.value(),
        "session started"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            persona: persona_template(scenario.persona_type),
            questions: question_plan(&scenario),
            pressure,
            band: pressure.band(),
            scenario,
        }),
    ))
}

/// Error for a session id that is not active: ended or unknown.
async fn inactive_session(state: &Arc<AppState>, session_id: &str) -> ApiError {
    let pool = state.pool.clone();
    let id = session_id.to_string();
    let record = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(db_error)?;
        load_session(&conn, &id).map_err(db_error)
    })
    .await;

    match record {
        Ok(Ok(Some(_))) => ApiError::Conflict(format!("session {session_id} has ended")),
        Ok(Ok(None)) => ApiError::NotFound(format!("session {session_id}")),
        Ok(Err(e)) => e,
        Err(e) => join_error(e),
    }
}

/// Handler for `POST /api/sessions/{session_id}/utterances`.
pub async fn append_utterance_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<UtteranceRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    if request.text.chars().count() > MAX_UTTERANCE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "utterance exceeds {MAX_UTTERANCE_CHARS} characters"
        )));
    }

    let Some(handle) = state.sessions.get(&session_id) else {
        return Err(inactive_session(&state, &session_id).await);
    };

    // Held until the events are written, so event order matches turn order.
    let mut slot = handle.lock().await;
    if !slot.is_open() {
        return Err(closed_session(&session_id, slot.ended));
    }

    // Acquired before the turn is applied: a request that fails here leaves
    // the session untouched and can be retried.
    let pool = state.pool.clone();
    let conn = tokio::task::spawn_blocking(move || pool.get().map_err(db_error))
        .await
        .map_err(join_error)??;

    let timestamp = request.timestamp.unwrap_or_else(Utc::now);
    let outcome = slot
        .state
        .append_utterance(&state.classifier, request.text, timestamp);

    let events_tx = state.events_tx.clone();
    let db_id = session_id.clone();
    let mut payloads = vec![EventPayload::utterance_classified(&outcome)];
    if let Some(event) = &outcome.event {
        payloads.push(EventPayload::pressure_changed(event));
    }
    let emitted = tokio::task::spawn_blocking(move || {
        for payload in &payloads {
            emit_and_broadcast(&conn, &db_id, payload, &events_tx);
        }
    })
    .await;
    if let Err(e) = emitted {
        tracing::warn!(
            session_id = %session_id,
            ordinal = outcome.utterance.ordinal,
            error = %e,
            "utterance events not recorded"
        );
    }
    drop(slot);

    Ok(Json(outcome))
}

fn closed_session(session_id: &str, ended: bool) -> ApiError {
    if ended {
        ApiError::Conflict(format!("session {session_id} has ended"))
    } else {
        ApiError::Conflict(format!("session {session_id} is ending"))
    }
}

fn active_view(session_id: String, session: &SessionState) -> SessionView {
    SessionView {
        session_id,
        status: SessionStatus::Active,
        scenario: session.scenario().clone(),
        pressure: session.level(),
        band: session.level().band(),
        total_exchanges: session.total_exchanges(),
        counters: session.counters(),
        pressure_events: session.pressure().events().to_vec(),
        transcript: session.transcript().to_vec(),
    }
}

/// Handler for `GET /api/sessions/{session_id}`.
pub async fn get_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    if let Some(handle) = state.sessions.get(&session_id) {
        let slot = handle.lock().await;
        if !slot.ended {
            return Ok(Json(active_view(session_id, &slot.state)));
        }
    }

    let pool = state.pool.clone();
    let id = session_id.clone();
    let (record, stored) = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(db_error)?;
        let record = load_session(&conn, &id).map_err(db_error)?;
        let stored = load_scorecard(&conn, &id).map_err(db_error)?;
        Ok::<_, ApiError>((record, stored))
    })
    .await
    .map_err(join_error)??;

    let record = record.ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))?;
    let view = match stored {
        Some(stored) => SessionView {
            session_id,
            status: record.status,
            scenario: record.scenario,
            pressure: stored.scorecard.final_pressure,
            band: stored.scorecard.final_pressure.band(),
            total_exchanges: stored.scorecard.total_exchanges,
            counters: stored.scorecard.counters,
            pressure_events: stored.scorecard.pressure_events,
            transcript: stored.transcript,
        },
        None => SessionView {
            session_id,
            status: record.status,
            pressure: record.scenario.difficulty,
            band: record.scenario.difficulty.band(),
            scenario: record.scenario,
            total_exchanges: 0,
            counters: SessionCounters::default(),
            pressure_events: Vec::new(),
            transcript: Vec::new(),
        },
    };
    Ok(Json(view))
}

/// Handler for `POST /api/sessions/{session_id}/end`.
///
/// Aggregates the scorecard, hands it to every sink and archives the
/// session. The first attempt freezes the scorecard and closes the session
/// to utterances; if a sink fails the call can be retried and every sink
/// receives that same scorecard again.
pub async fn end_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<EndSessionResponse>, ApiError> {
    let Some(handle) = state.sessions.get(&session_id) else {
        return Err(inactive_session(&state, &session_id).await);
    };

    let mut slot = handle.lock().await;
    if slot.ended {
        return Err(ApiError::Conflict(format!("session {session_id} has ended")));
    }

    let scorecard = slot.freeze_scorecard();
    let transcript = slot.state.transcript().to_vec();

    let db_state = Arc::clone(&state);
    let db_id = session_id.clone();
    let db_card = scorecard.clone();
    tokio::task::spawn_blocking(move || {
        let record = ScorecardRecord {
            session_id: &db_id,
            scorecard: &db_card,
            transcript: &transcript,
        };
        store_all(&db_state.sinks, &record).map_err(|e| match &e {
            ObserveError::DuplicateScorecard(_) => ApiError::Conflict(e.to_string()),
            _ => ApiError::InternalServerError(e.to_string()),
        })?;

        let conn = db_state.pool.get().map_err(db_error)?;
        mark_session_ended(&conn, &db_id).map_err(db_error)?;
        emit_and_broadcast(
            &conn,
            &db_id,
            &EventPayload::SessionEnded {
                total_exchanges: db_card.total_exchanges,
                final_pressure: db_card.final_pressure.value(),
                overall: db_card.scores.overall,
            },
            &db_state.events_tx,
        );
        Ok::<_, ApiError>(())
    })
    .await
    .map_err(join_error)??;

    slot.ended = true;
    drop(slot);
    state.sessions.remove(&session_id);

    tracing::info!(
        session_id = %session_id,
        total_exchanges = scorecard.total_exchanges,
        overall = scorecard.scores.overall,
        "session ended"
    );

    Ok(Json(EndSessionResponse {
        report: render_report(&scorecard),
        session_id,
        scorecard,
    }))
}

/// Handler for `GET /api/scorecards/{session_id}`.
///
/// `?format=text` returns the plain-text report instead of JSON.
pub async fn get_scorecard_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(params): Query<ScorecardQuery>,
) -> Result<Response, ApiError> {
    let as_text = match params.format.as_deref() {
        None | Some("json") => false,
        Some("text") => true,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "invalid format: {other}. Expected json or text"
            )))
        }
    };

    let pool = state.pool.clone();
    let id = session_id.clone();
    let stored = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(db_error)?;
        load_scorecard(&conn, &id).map_err(db_error)
    })
    .await
    .map_err(join_error)??
    .ok_or_else(|| ApiError::NotFound(format!("scorecard for session {session_id}")))?;

    if as_text {
        let report = render_report(&stored.scorecard);
        Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report,
        )
            .into_response())
    } else {
        Ok(Json(stored).into_response())
    }
}
