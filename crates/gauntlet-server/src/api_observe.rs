//! Session event API handlers.
//!
//! Provides:
//! - `GET /api/events`: filtered event retrieval from the log
//! - `GET /api/events/stream`: SSE stream of live session events

use crate::api::ApiError;
use crate::AppState;
use axum::{
    extract::{Extension, Query},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::Stream;
use gauntlet_observe::{query_events, EventDomain, EventFilter, SessionEvent};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Query parameters for `GET /api/events`.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub session_id: Option<String>,
    /// `SESSION`, `UTTERANCE` or `PRESSURE`.
    pub domain: Option<String>,
    pub event_type: Option<String>,
    /// Return events that occurred at or after this ISO 8601 timestamp.
    pub since: Option<String>,
    /// Maximum number of events to return (default: 100, max: 1000).
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<SessionEvent>,
    pub count: usize,
}

fn parse_domain(domain: Option<&str>) -> Result<Option<EventDomain>, ApiError> {
    domain
        .map(|d| {
            d.parse().map_err(|_| {
                ApiError::BadRequest(format!(
                    "invalid domain: {d}. Expected one of: SESSION, UTTERANCE, PRESSURE"
                ))
            })
        })
        .transpose()
}

/// Handler for `GET /api/events`.
pub async fn get_events_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let filter = EventFilter {
        session_id: params.session_id,
        domain: parse_domain(params.domain.as_deref())?,
        event_type: params.event_type,
        since: params.since,
        limit: params.limit,
    };

    let pool = state.pool.clone();
    let events = tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        query_events(&conn, &filter)
            .map_err(|e| ApiError::InternalServerError(format!("event query failed: {e}")))
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    Ok(Json(EventsResponse {
        count: events.len(),
        events,
    }))
}

/// Query parameters for `GET /api/events/stream`.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub session_id: Option<String>,
    pub domain: Option<String>,
}

/// Handler for `GET /api/events/stream`.
///
/// Streams events as they are recorded. Subscribers that fall behind skip
/// the events they missed.
pub async fn get_event_stream_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let domain = parse_domain(params.domain.as_deref())?;
    let session_id = params.session_id;

    let stream = BroadcastStream::new(state.events_tx.subscribe()).filter_map(move |result| {
        let event = result.ok()?;
        if domain.is_some_and(|d| event.domain != d.as_str()) {
            return None;
        }
        if session_id.as_ref().is_some_and(|id| &event.session_id != id) {
            return None;
        }
        match serde_json::to_string(&event) {
            Ok(data) => Some(Ok(Event::default().event(event.event_type.clone()).data(data))),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize session event");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
