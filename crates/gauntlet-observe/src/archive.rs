//! Session records in the `sessions` table.

use gauntlet_scenario::ScenarioDescriptor;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::ObserveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Ended => "ENDED",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "ENDED" => Some(Self::Ended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub scenario: ScenarioDescriptor,
    pub status: SessionStatus,
    pub created_at: String,
    pub ended_at: Option<String>,
}

/// Inserts the row for a newly started session.
///
/// # Errors
///
/// Returns `ObserveError::Database` on SQL failure, including a reused
/// session id.
pub fn record_session(
    conn: &Connection,
    session_id: &str,
    scenario: &ScenarioDescriptor,
) -> Result<(), ObserveError> {
    let scenario_json = serde_json::to_string(scenario)?;
    conn.execute(
        "INSERT INTO sessions
            (session_id, persona_type, company, role, starting_pressure, scenario_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session_id,
            scenario.persona_type.as_str(),
            scenario.company,
            scenario.role,
            scenario.difficulty.value(),
            scenario_json,
        ],
    )?;
    Ok(())
}

/// Marks a session ended. Returns `false` if it was unknown or already ended.
///
/// # Errors
///
/// Returns `ObserveError::Database` on SQL failure.
pub fn mark_session_ended(conn: &Connection, session_id: &str) -> Result<bool, ObserveError> {
    let changed = conn.execute(
        "UPDATE sessions
         SET status = 'ENDED', ended_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE session_id = ?1 AND status = 'ACTIVE'",
        params![session_id],
    )?;
    Ok(changed == 1)
}

/// Loads a session record.
///
/// # Errors
///
/// Returns `ObserveError::Database` on SQL failure or
/// `ObserveError::Serialization` if the stored scenario is unreadable.
pub fn load_session(
    conn: &Connection,
    session_id: &str,
) -> Result<Option<SessionRecord>, ObserveError> {
    let row = conn
        .query_row(
            "SELECT scenario_json, status, created_at, ended_at
             FROM sessions WHERE session_id = ?1",
            params![session_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((scenario_json, status, created_at, ended_at)) = row else {
        return Ok(None);
    };

    Ok(Some(SessionRecord {
        session_id: session_id.to_string(),
        scenario: serde_json::from_str(&scenario_json)?,
        status: SessionStatus::parse(&status).unwrap_or(SessionStatus::Ended),
        created_at,
        ended_at,
    }))
}
