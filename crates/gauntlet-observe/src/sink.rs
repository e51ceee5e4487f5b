//! Scorecard sinks.
//!
//! A finished session's scorecard is handed to every configured
//! [`ScorecardSink`]. The engine never writes storage itself.

use std::path::{Path, PathBuf};

use gauntlet_db::DbPool;
use gauntlet_engine::{Scorecard, TranscriptEntry};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::ObserveError;

/// Everything a sink receives for one finished session.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardRecord<'a> {
    pub session_id: &'a str,
    pub scorecard: &'a Scorecard,
    pub transcript: &'a [TranscriptEntry],
}

/// Destination for finished scorecards.
pub trait ScorecardSink: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Persists one scorecard.
    fn store(&self, record: &ScorecardRecord<'_>) -> Result<(), ObserveError>;
}

/// A scorecard as read back from the `scorecards` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScorecard {
    pub session_id: String,
    pub scorecard: Scorecard,
    pub transcript: Vec<TranscriptEntry>,
    pub created_at: String,
}

/// Inserts a scorecard row. Each session gets at most one.
///
/// Re-inserting the identical scorecard and transcript is a no-op, so an
/// `end` retried after a later sink failed lands on the same row.
///
/// # Errors
///
/// Returns `ObserveError::DuplicateScorecard` if a different scorecard is
/// already recorded, otherwise `Database` or `Serialization` failures.
pub fn insert_scorecard(conn: &Connection, record: &ScorecardRecord<'_>) -> Result<(), ObserveError> {
    let scorecard_json = serde_json::to_string(record.scorecard)?;
    let transcript_json = serde_json::to_string(record.transcript)?;

    let existing: Option<(String, String)> = conn
        .query_row(
            "SELECT scorecard_json, transcript_json FROM scorecards WHERE session_id = ?1",
            params![record.session_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    if let Some((stored_scorecard, stored_transcript)) = existing {
        if stored_scorecard == scorecard_json && stored_transcript == transcript_json {
            tracing::debug!(
                session_id = record.session_id,
                "scorecard already recorded, skipping insert"
            );
            return Ok(());
        }
        return Err(ObserveError::DuplicateScorecard(record.session_id.to_string()));
    }

    let scores = &record.scorecard.scores;
    conn.execute(
        "INSERT INTO scorecards
            (session_id, overall, clarity, confidence, commitment, adaptability,
             total_exchanges, scorecard_json, transcript_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.session_id,
            scores.overall,
            scores.clarity,
            scores.confidence,
            scores.commitment,
            scores.adaptability,
            record.scorecard.total_exchanges as i64,
            scorecard_json,
            transcript_json,
        ],
    )?;
    Ok(())
}

/// Loads the scorecard for a session, if one was recorded.
///
/// # Errors
///
/// Returns `Database` or `Serialization` failures.
pub fn load_scorecard(
    conn: &Connection,
    session_id: &str,
) -> Result<Option<StoredScorecard>, ObserveError> {
    let row = conn
        .query_row(
            "SELECT scorecard_json, transcript_json, created_at
             FROM scorecards WHERE session_id = ?1",
            params![session_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((scorecard_json, transcript_json, created_at)) = row else {
        return Ok(None);
    };
    Ok(Some(StoredScorecard {
        session_id: session_id.to_string(),
        scorecard: serde_json::from_str(&scorecard_json)?,
        transcript: serde_json::from_str(&transcript_json)?,
        created_at,
    }))
}

/// Writes scorecards to the `scorecards` table.
#[derive(Clone)]
pub struct SqliteScorecardSink {
    pool: DbPool,
}

impl SqliteScorecardSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ScorecardSink for SqliteScorecardSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn store(&self, record: &ScorecardRecord<'_>) -> Result<(), ObserveError> {
        let conn = self.pool.get()?;
        insert_scorecard(&conn, record)
    }
}

/// Writes `scorecard_<session>.json` files into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScorecardFile<'a> {
    session_id: &'a str,
    scenario: &'a gauntlet_scenario::ScenarioDescriptor,
    scorecard: &'a Scorecard,
    transcript: &'a [TranscriptEntry],
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the scorecard for `session_id` is written to.
    pub fn path_for(&self, session_id: &str) -> PathBuf {
        let safe: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("scorecard_{safe}.json"))
    }
}

impl ScorecardSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json_file"
    }

    fn store(&self, record: &ScorecardRecord<'_>) -> Result<(), ObserveError> {
        std::fs::create_dir_all(&self.dir)?;
        let file = ScorecardFile {
            session_id: record.session_id,
            scenario: &record.scorecard.scenario,
            scorecard: record.scorecard,
            transcript: record.transcript,
        };
        let path = self.path_for(record.session_id);
        std::fs::write(&path, serde_json::to_vec_pretty(&file)?)?;
        tracing::info!(path = %path.display(), "scorecard exported");
        Ok(())
    }
}

/// Hands `record` to every sink, stopping at the first failure.
///
/// # Errors
///
/// Returns the first sink error.
pub fn store_all(
    sinks: &[std::sync::Arc<dyn ScorecardSink>],
    record: &ScorecardRecord<'_>,
) -> Result<(), ObserveError> {
    for sink in sinks {
        sink.store(record).inspect_err(|e| {
            tracing::warn!(
                sink = sink.name(),
                session_id = record.session_id,
                error = %e,
                "scorecard sink failed"
            );
        })?;
    }
    Ok(())
}
