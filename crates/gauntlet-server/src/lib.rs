//! Gauntlet server library logic.
//!
//! Exposes the scoring engine over HTTP: sessions are opened from a scenario,
//! fed utterances one at a time, and closed into a scorecard. Session
//! activity is recorded in the event log and streamed to SSE subscribers.

pub mod api;
pub mod api_observe;
pub mod api_sessions;
pub mod config;
pub mod registry;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use config::Config;
use gauntlet_db::DbPool;
use gauntlet_engine::{PressureConfig, ResponseClassifier};
use gauntlet_observe::{JsonFileSink, ScorecardSink, SessionEvent, SqliteScorecardSink};
use registry::SessionRegistry;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Capacity of the live event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Maximum request body size (256 KiB).
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    /// Shared by every session; classification is stateless.
    pub classifier: Arc<ResponseClassifier>,
    pub pressure: PressureConfig,
    pub sessions: SessionRegistry,
    /// Destinations for finished scorecards, written in order.
    pub sinks: Vec<Arc<dyn ScorecardSink>>,
    /// Broadcast channel for live session events (SSE stream).
    pub events_tx: broadcast::Sender<SessionEvent>,
}

impl AppState {
    /// Builds state from configuration. The database sink is always present;
    /// JSON export is added when `scorecards.export_dir` is set.
    pub fn new(pool: DbPool, config: &Config) -> Self {
        let mut sinks: Vec<Arc<dyn ScorecardSink>> =
            vec![Arc::new(SqliteScorecardSink::new(pool.clone()))];
        if let Some(dir) = &config.scorecards.export_dir {
            tracing::info!(dir = %dir, "scorecard JSON export enabled");
            sinks.push(Arc::new(JsonFileSink::new(dir)));
        }

        Self {
            pool,
            classifier: Arc::new(ResponseClassifier::new(&config.classifier)),
            pressure: config.pressure,
            sessions: SessionRegistry::new(),
            sinks,
            events_tx: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }
}

/// Records an event and broadcasts it to live subscribers.
///
/// Failures are logged as warnings and never block the caller.
pub fn emit_and_broadcast(
    conn: &rusqlite::Connection,
    session_id: &str,
    payload: &gauntlet_observe::EventPayload,
    events_tx: &broadcast::Sender<SessionEvent>,
) {
    match gauntlet_observe::emit_event(conn, session_id, payload) {
        Ok(event) => {
            // No receivers is the normal case when nobody is streaming.
            let _ = events_tx.send(event);
        }
        Err(e) => {
            tracing::warn!(
                session_id,
                event_type = payload.event_type(),
                error = %e,
                "failed to emit session event"
            );
        }
    }
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/personas", get(api::list_personas_handler))
        .route("/api/sessions", post(api_sessions::create_session_handler))
        .route(
            "/api/sessions/{session_id}",
            get(api_sessions::get_session_handler),
        )
        .route(
            "/api/sessions/{session_id}/utterances",
            post(api_sessions::append_utterance_handler),
        )
        .route(
            "/api/sessions/{session_id}/end",
            post(api_sessions::end_session_handler),
        )
        .route(
            "/api/scorecards/{session_id}",
            get(api_sessions::get_scorecard_handler),
        )
        .route("/api/events", get(api_observe::get_events_handler))
        .route(
            "/api/events/stream",
            get(api_observe::get_event_stream_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
