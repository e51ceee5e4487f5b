//! Shared types and constants for the Gauntlet training platform.
//!
//! This crate holds the vocabulary every other crate speaks: the persona
//! catalogue, the pressure level scalar with its legacy 1–5 mapping, and the
//! presentation bands derived from it.
//!
//! Nothing here performs I/O. Higher crates depend on `gauntlet-types` for
//! cross-cutting definitions so the dependency graph stays acyclic.

mod pressure;

pub use pressure::{
    normalize_difficulty, DifficultyError, PressureBand, PressureLevel, DEFAULT_PRESSURE,
    LEGACY_MAX, LEGACY_MIN,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simulated counterpart the user is practising against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonaType {
    /// Frustrated customer demanding immediate resolution.
    AngryCustomer,
    /// Senior interviewer testing technical and cultural fit.
    EliteInterviewer,
    /// Experienced negotiator seeking the best deal.
    ToughNegotiator,
    /// Investor questioning business fundamentals.
    SkepticalInvestor,
    /// High-value client with strict requirements.
    DemandingClient,
}

impl PersonaType {
    /// Every persona, in catalogue order.
    pub const ALL: [PersonaType; 5] = [
        PersonaType::AngryCustomer,
        PersonaType::EliteInterviewer,
        PersonaType::ToughNegotiator,
        PersonaType::SkepticalInvestor,
        PersonaType::DemandingClient,
    ];

    /// Returns the canonical wire label (e.g. `ANGRY_CUSTOMER`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AngryCustomer => "ANGRY_CUSTOMER",
            Self::EliteInterviewer => "ELITE_INTERVIEWER",
            Self::ToughNegotiator => "TOUGH_NEGOTIATOR",
            Self::SkepticalInvestor => "SKEPTICAL_INVESTOR",
            Self::DemandingClient => "DEMANDING_CLIENT",
        }
    }

    /// Human-readable name, lowercase with spaces.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::AngryCustomer => "angry customer",
            Self::EliteInterviewer => "elite interviewer",
            Self::ToughNegotiator => "tough negotiator",
            Self::SkepticalInvestor => "skeptical investor",
            Self::DemandingClient => "demanding client",
        }
    }
}

impl fmt::Display for PersonaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaType {
    type Err = ParsePersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePersonaError(s.to_string()))
    }
}

/// Error returned when parsing an unknown persona label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown persona type: {0}")]
pub struct ParsePersonaError(pub String);
