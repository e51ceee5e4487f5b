//! Event domain, payload, and record types for the session event log.

use gauntlet_engine::{PressureDirection, PressureEvent, TurnOutcome};
use gauntlet_scenario::ScenarioDescriptor;
use serde::{Deserialize, Serialize};

/// Event domains, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventDomain {
    /// Session lifecycle: started, ended.
    Session,
    /// Per-utterance classification.
    Utterance,
    /// Pressure adjustments.
    Pressure,
}

impl EventDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "SESSION",
            Self::Utterance => "UTTERANCE",
            Self::Pressure => "PRESSURE",
        }
    }
}

impl std::fmt::Display for EventDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventDomain {
    type Err = ParseEventDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SESSION" => Ok(Self::Session),
            "UTTERANCE" => Ok(Self::Utterance),
            "PRESSURE" => Ok(Self::Pressure),
            _ => Err(ParseEventDomainError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown event domain string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event domain: {0}")]
pub struct ParseEventDomainError(pub String);

/// Structured event payloads, stored as JSON in `payload_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ── Session domain ───────────────────────────────────────────────
    SessionStarted {
        persona_type: String,
        company: String,
        role: String,
        starting_pressure: f64,
    },

    SessionEnded {
        total_exchanges: u64,
        final_pressure: f64,
        overall: f64,
    },

    // ── Utterance domain ─────────────────────────────────────────────
    /// One utterance was classified. The text itself stays in the transcript.
    UtteranceClassified {
        ordinal: u64,
        is_vague: bool,
        is_deflection: bool,
        has_commitment: bool,
        pressure: f64,
    },

    // ── Pressure domain ──────────────────────────────────────────────
    PressureEscalated { ordinal: u64, from: f64, to: f64 },

    PressureDeescalated { ordinal: u64, from: f64, to: f64 },
}

impl EventPayload {
    pub fn session_started(scenario: &ScenarioDescriptor) -> Self {
        Self::SessionStarted {
            persona_type: scenario.persona_type.as_str().to_string(),
            company: scenario.company.clone(),
            role: scenario.role.clone(),
            starting_pressure: scenario.difficulty.value(),
        }
    }

    pub fn utterance_classified(outcome: &TurnOutcome) -> Self {
        Self::UtteranceClassified {
            ordinal: outcome.utterance.ordinal,
            is_vague: outcome.classification.is_vague,
            is_deflection: outcome.classification.is_deflection,
            has_commitment: outcome.classification.has_commitment(),
            pressure: outcome.pressure.value(),
        }
    }

    pub fn pressure_changed(event: &PressureEvent) -> Self {
        let (ordinal, from, to) = (event.ordinal, event.from.value(), event.to.value());
        match event.direction {
            PressureDirection::Escalated => Self::PressureEscalated { ordinal, from, to },
            PressureDirection::Deescalated => Self::PressureDeescalated { ordinal, from, to },
        }
    }

    /// Canonical event type string, stored in `event_type`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "SESSION_STARTED",
            Self::SessionEnded { .. } => "SESSION_ENDED",
            Self::UtteranceClassified { .. } => "UTTERANCE_CLASSIFIED",
            Self::PressureEscalated { .. } => "PRESSURE_ESCALATED",
            Self::PressureDeescalated { .. } => "PRESSURE_DEESCALATED",
        }
    }

    pub fn domain(&self) -> EventDomain {
        match self {
            Self::SessionStarted { .. } | Self::SessionEnded { .. } => EventDomain::Session,
            Self::UtteranceClassified { .. } => EventDomain::Utterance,
            Self::PressureEscalated { .. } | Self::PressureDeescalated { .. } => {
                EventDomain::Pressure
            }
        }
    }
}

/// A single row from the `session_event_log` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: i64,
    pub session_id: String,
    pub domain: String,
    pub event_type: String,
    /// Position within the session's event stream, starting at 1.
    pub seq: i64,
    pub payload_json: String,
    pub occurred_at: String,
}

impl SessionEvent {
    /// Decodes the stored payload.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the stored JSON is not a known payload.
    pub fn payload(&self) -> Result<EventPayload, serde_json::Error> {
        serde_json::from_str(&self.payload_json)
    }
}
