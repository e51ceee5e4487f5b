//! Error types for the observability layer.

/// Errors that can occur while logging events or storing scorecards.
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    #[error("observe database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("observe pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization or deserialization failed.
    #[error("observe serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("scorecard export failed: {0}")]
    Io(#[from] std::io::Error),

    /// A scorecard already exists for the session. Scorecards are written once.
    #[error("scorecard already recorded for session {0}")]
    DuplicateScorecard(String),
}
