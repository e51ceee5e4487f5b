//! Persistence operations for the session event log.
//!
//! All writes go through [`emit_event`], which serialises the payload,
//! assigns the next per-session sequence number, and inserts in a single
//! statement. Reads go through [`query_events`].

use rusqlite::{params, Connection};

use crate::error::ObserveError;
use crate::event::{EventDomain, EventPayload, SessionEvent};

/// Default and maximum page size for [`query_events`].
pub const DEFAULT_EVENT_LIMIT: i64 = 100;
pub const MAX_EVENT_LIMIT: i64 = 1_000;

/// Appends one event to a session's log.
///
/// # Errors
///
/// Returns `ObserveError::Database` on SQL failure (including an unknown
/// session) or `ObserveError::Serialization` if the payload cannot be
/// serialised.
pub fn emit_event(
    conn: &Connection,
    session_id: &str,
    payload: &EventPayload,
) -> Result<SessionEvent, ObserveError> {
    let payload_json = serde_json::to_string(payload)?;
    let domain = payload.domain();
    let event_type = payload.event_type();

    // The sequence subquery runs inside the INSERT, so concurrent writers
    // cannot observe the same MAX(seq).
    let (id, seq, occurred_at) = conn.query_row(
        "INSERT INTO session_event_log
            (session_id, seq, domain, event_type, payload_json, occurred_at)
         VALUES (
            ?1,
            (SELECT COALESCE(MAX(seq), 0) + 1 FROM session_event_log WHERE session_id = ?1),
            ?2, ?3, ?4,
            strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         )
         RETURNING id, seq, occurred_at",
        params![session_id, domain.as_str(), event_type, payload_json],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    )?;

    tracing::debug!(session_id, seq, event_type, "session event recorded");

    Ok(SessionEvent {
        id,
        session_id: session_id.to_string(),
        domain: domain.as_str().to_string(),
        event_type: event_type.to_string(),
        seq,
        payload_json,
        occurred_at,
    })
}

/// Returns the sequence number the next event for `session_id` will get.
///
/// # Errors
///
/// Returns `ObserveError::Database` on SQL failure.
pub fn next_seq(conn: &Connection, session_id: &str) -> Result<i64, ObserveError> {
    let max_seq: Option<i64> = conn.query_row(
        "SELECT MAX(seq) FROM session_event_log WHERE session_id = ?1",
        params![session_id],
        |row| row.get(0),
    )?;
    Ok(max_seq.unwrap_or(0) + 1)
}

/// Filter criteria for querying the event log.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub session_id: Option<String>,
    pub domain: Option<EventDomain>,
    pub event_type: Option<String>,
    /// Return events that occurred at or after this ISO 8601 timestamp.
    pub since: Option<String>,
    /// Maximum number of events to return (default 100, capped at 1000).
    pub limit: Option<i64>,
}

/// Queries the event log, oldest first.
///
/// # Errors
///
/// Returns `ObserveError::Database` on SQL failure.
pub fn query_events(
    conn: &Connection,
    filter: &EventFilter,
) -> Result<Vec<SessionEvent>, ObserveError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref session_id) = filter.session_id {
        param_values.push(Box::new(session_id.clone()));
        clauses.push(format!("session_id = ?{}", param_values.len()));
    }

    if let Some(domain) = filter.domain {
        param_values.push(Box::new(domain.as_str()));
        clauses.push(format!("domain = ?{}", param_values.len()));
    }

    if let Some(ref event_type) = filter.event_type {
        param_values.push(Box::new(event_type.clone()));
        clauses.push(format!("event_type = ?{}", param_values.len()));
    }

    if let Some(ref since) = filter.since {
        param_values.push(Box::new(since.clone()));
        clauses.push(format!("occurred_at >= ?{}", param_values.len()));
    }

    let limit = filter
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);
    param_values.push(Box::new(limit));
    let limit_idx = param_values.len();

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT id, session_id, domain, event_type, seq, payload_json, occurred_at
         FROM session_event_log
         {where_clause}
         ORDER BY id ASC
         LIMIT ?{limit_idx}"
    );

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| &**p).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok(SessionEvent {
            id: row.get(0)?,
            session_id: row.get(1)?,
            domain: row.get(2)?,
            event_type: row.get(3)?,
            seq: row.get(4)?,
            payload_json: row.get(5)?,
            occurred_at: row.get(6)?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }

    Ok(events)
}
