//! Error types for scenario validation.

use gauntlet_types::DifficultyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A field every scenario must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredField {
    PersonaType,
    Company,
    Role,
    Stakes,
    UserGoal,
    Difficulty,
}

impl RequiredField {
    /// Collection order used when asking the user for missing fields.
    pub const ORDER: [RequiredField; 6] = [
        RequiredField::PersonaType,
        RequiredField::Company,
        RequiredField::Role,
        RequiredField::Stakes,
        RequiredField::UserGoal,
        RequiredField::Difficulty,
    ];

    /// Returns the wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PersonaType => "personaType",
            Self::Company => "company",
            Self::Role => "role",
            Self::Stakes => "stakes",
            Self::UserGoal => "userGoal",
            Self::Difficulty => "difficulty",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in a scenario.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioIssue {
    /// A required field is absent or blank.
    #[error("missing required field: {0}")]
    MissingField(RequiredField),

    /// The persona label is not in the catalogue.
    #[error("invalid persona type: {0} (expected one of ANGRY_CUSTOMER, ELITE_INTERVIEWER, TOUGH_NEGOTIATOR, SKEPTICAL_INVESTOR, DEMANDING_CLIENT)")]
    InvalidPersona(String),

    /// The difficulty could not be interpreted on either scale.
    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(#[from] DifficultyError),
}

/// Raised at session setup when a scenario cannot be accepted.
///
/// Carries every issue found so the caller can fix them in one pass. These
/// are configuration bugs, never transient, and are not retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("scenario validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    /// All problems found, in field order.
    pub issues: Vec<ScenarioIssue>,
}

impl ValidationError {
    /// Human-readable messages, one per issue.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

fn join_issues(issues: &[ScenarioIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
