//! Scenario input parsing and validation.

use crate::error::{RequiredField, ScenarioIssue, ValidationError};
use gauntlet_types::{normalize_difficulty, PersonaType, PressureLevel};
use serde::{Deserialize, Serialize};

/// Scenario fields as supplied by a caller, before validation.
///
/// Accepts both the canonical camelCase names and the older aliases
/// (`persona`, `persona_type`, `goals`, `user_goal`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScenario {
    #[serde(alias = "persona", alias = "persona_type")]
    pub persona_type: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub stakes: Option<String>,
    #[serde(alias = "goals", alias = "user_goal")]
    pub user_goal: Option<String>,
    /// Unit-scale `[0, 1]`, or legacy `1..=5`.
    pub difficulty: Option<f64>,
    #[serde(default, alias = "source_docs")]
    pub source_docs: Vec<String>,
}

/// A validated scenario.
///
/// Opaque to the scoring engine beyond being copied into the scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDescriptor {
    pub persona_type: PersonaType,
    pub company: String,
    pub role: String,
    pub stakes: String,
    pub user_goal: String,
    /// Starting pressure, already normalized to the unit scale.
    pub difficulty: PressureLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_docs: Vec<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Lists required fields that are absent or blank, in collection order.
///
/// `difficulty` is listed when absent even though validation falls back to the
/// default level for it; a conversational setup still asks for it.
pub fn missing_fields(raw: &RawScenario) -> Vec<RequiredField> {
    RequiredField::ORDER
        .into_iter()
        .filter(|field| match field {
            RequiredField::PersonaType => present(&raw.persona_type).is_none(),
            RequiredField::Company => present(&raw.company).is_none(),
            RequiredField::Role => present(&raw.role).is_none(),
            RequiredField::Stakes => present(&raw.stakes).is_none(),
            RequiredField::UserGoal => present(&raw.user_goal).is_none(),
            RequiredField::Difficulty => raw.difficulty.is_none(),
        })
        .collect()
}

/// Validates a raw scenario and produces a typed descriptor.
///
/// Every text field and the persona are required. `difficulty` is optional
/// and defaults to [`PressureLevel::default`]; when present it must lie in
/// `[0, 1]` or the legacy `[1, 5]` range.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every issue found.
pub fn validate_scenario(raw: &RawScenario) -> Result<ScenarioDescriptor, ValidationError> {
    let mut issues = Vec::new();

    let persona = match present(&raw.persona_type) {
        None => {
            issues.push(ScenarioIssue::MissingField(RequiredField::PersonaType));
            None
        }
        Some(label) => match label.parse::<PersonaType>() {
            Ok(persona) => Some(persona),
            Err(_) => {
                issues.push(ScenarioIssue::InvalidPersona(label.to_string()));
                None
            }
        },
    };

    let mut text = |field: RequiredField, value: &Option<String>| -> String {
        match present(value) {
            Some(v) => v.to_string(),
            None => {
                issues.push(ScenarioIssue::MissingField(field));
                String::new()
            }
        }
    };
    let company = text(RequiredField::Company, &raw.company);
    let role = text(RequiredField::Role, &raw.role);
    let stakes = text(RequiredField::Stakes, &raw.stakes);
    let user_goal = text(RequiredField::UserGoal, &raw.user_goal);

    let difficulty = match raw.difficulty {
        None => {
            tracing::debug!("scenario has no difficulty, using default starting level");
            PressureLevel::default()
        }
        Some(value) => match normalize_difficulty(value) {
            Ok(level) => level,
            Err(e) => {
                issues.push(ScenarioIssue::InvalidDifficulty(e));
                PressureLevel::default()
            }
        },
    };

    match persona {
        Some(persona_type) if issues.is_empty() => Ok(ScenarioDescriptor {
            persona_type,
            company,
            role,
            stakes,
            user_goal,
            difficulty,
            source_docs: raw.source_docs.clone(),
        }),
        _ => Err(ValidationError { issues }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_types::DifficultyError;

    fn raw() -> RawScenario {
        RawScenario {
            persona_type: Some("ELITE_INTERVIEWER".to_string()),
            company: Some("Globex".to_string()),
            role: Some("Staff Engineer".to_string()),
            stakes: Some("Final round".to_string()),
            user_goal: Some("Get the offer".to_string()),
            difficulty: Some(0.4),
            source_docs: vec!["job-description.md".to_string()],
        }
    }

    #[test]
    fn valid_scenario_passes() {
        let scenario = validate_scenario(&raw()).unwrap();
        assert_eq!(scenario.persona_type, PersonaType::EliteInterviewer);
        assert_eq!(scenario.company, "Globex");
        assert_eq!(scenario.difficulty.value(), 0.4);
        assert_eq!(scenario.source_docs, vec!["job-description.md".to_string()]);
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let mut r = raw();
        r.company = Some("   ".to_string());
        r.stakes = None;

        let err = validate_scenario(&r).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                ScenarioIssue::MissingField(RequiredField::Company),
                ScenarioIssue::MissingField(RequiredField::Stakes),
            ]
        );
    }

    #[test]
    fn all_issues_reported_together() {
        let r = RawScenario {
            persona_type: Some("FRIENDLY_NEIGHBOUR".to_string()),
            difficulty: Some(7.0),
            ..RawScenario::default()
        };

        let err = validate_scenario(&r).unwrap_err();
        assert_eq!(err.issues.len(), 6);
        assert_eq!(
            err.issues[0],
            ScenarioIssue::InvalidPersona("FRIENDLY_NEIGHBOUR".to_string())
        );
        assert_eq!(
            err.issues[5],
            ScenarioIssue::InvalidDifficulty(DifficultyError::OutOfRange(7.0))
        );
        assert!(err.to_string().starts_with("scenario validation failed: "));
    }

    #[test]
    fn missing_difficulty_defaults_to_mid_scale() {
        let mut r = raw();
        r.difficulty = None;
        let scenario = validate_scenario(&r).unwrap();
        assert_eq!(scenario.difficulty, PressureLevel::default());
        assert_eq!(missing_fields(&r), vec![RequiredField::Difficulty]);
    }

    #[test]
    fn negative_difficulty_rejected() {
        let mut r = raw();
        r.difficulty = Some(-1.0);
        let err = validate_scenario(&r).unwrap_err();
        assert!(matches!(
            err.issues.as_slice(),
            [ScenarioIssue::InvalidDifficulty(_)]
        ));
    }

    #[test]
    fn missing_fields_in_collection_order() {
        let r = RawScenario {
            role: Some("PM".to_string()),
            ..RawScenario::default()
        };
        assert_eq!(
            missing_fields(&r),
            vec![
                RequiredField::PersonaType,
                RequiredField::Company,
                RequiredField::Stakes,
                RequiredField::UserGoal,
                RequiredField::Difficulty,
            ]
        );
    }
}
