//! Observability and persistence for Gauntlet sessions.
//!
//! Records every session's activity in an append-only event log and hands
//! finished scorecards to one or more sinks.
//!
//! # Event domains
//!
//! | Domain | Events |
//! |--------|--------|
//! | `SESSION` | `SESSION_STARTED`, `SESSION_ENDED` |
//! | `UTTERANCE` | `UTTERANCE_CLASSIFIED` |
//! | `PRESSURE` | `PRESSURE_ESCALATED`, `PRESSURE_DEESCALATED` |
//!
//! # Usage
//!
//! ```rust,ignore
//! use gauntlet_observe::{emit_event, EventPayload};
//!
//! emit_event(&conn, &session_id, &EventPayload::session_started(&scenario))?;
//! ```

mod archive;
mod error;
mod event;
mod sink;
mod store;

pub use archive::{load_session, mark_session_ended, record_session, SessionRecord, SessionStatus};
pub use error::ObserveError;
pub use event::{EventDomain, EventPayload, ParseEventDomainError, SessionEvent};
pub use sink::{
    insert_scorecard, load_scorecard, store_all, JsonFileSink, ScorecardRecord, ScorecardSink,
    SqliteScorecardSink, StoredScorecard,
};
pub use store::{emit_event, next_seq, query_events, EventFilter, DEFAULT_EVENT_LIMIT, MAX_EVENT_LIMIT};
