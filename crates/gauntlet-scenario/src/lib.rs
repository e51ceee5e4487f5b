//! Scenario contract for Gauntlet practice sessions.
//!
//! A scenario describes who the user is up against and why: a persona from
//! the fixed catalogue, the company and role in play, what is at stake, the
//! user's goal, and the starting difficulty. This crate turns loosely-typed
//! input into a validated [`ScenarioDescriptor`] and supplies the static
//! material derived from it.
//!
//! # Core types
//!
//! - [`RawScenario`]: caller-supplied fields, all optional, accepting the
//!   `persona`/`goals` aliases
//! - [`ScenarioDescriptor`]: validated, typed scenario copied into every
//!   session and scorecard
//! - [`ScenarioDraft`]: incremental collection of missing fields from
//!   free-text answers
//!
//! # Validation
//!
//! [`validate_scenario`] reports every problem at once in a
//! [`ValidationError`]. Validation happens before a session exists; nothing
//! downstream re-checks the descriptor.

pub mod descriptor;
pub mod draft;
pub mod error;
pub mod templates;

pub use descriptor::{missing_fields, validate_scenario, RawScenario, ScenarioDescriptor};
pub use draft::ScenarioDraft;
pub use error::{RequiredField, ScenarioIssue, ValidationError};
pub use templates::{persona_template, question_plan, PersonaTemplate};

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_types::PersonaType;

    fn complete_raw() -> RawScenario {
        RawScenario {
            persona_type: Some("TOUGH_NEGOTIATOR".to_string()),
            company: Some("Northwind".to_string()),
            role: Some("Account Executive".to_string()),
            stakes: Some("A three-year renewal".to_string()),
            user_goal: Some("Hold the list price".to_string()),
            difficulty: Some(0.8),
            source_docs: vec![],
        }
    }

    #[test]
    fn raw_scenario_accepts_aliases() {
        let raw: RawScenario = serde_json::from_value(serde_json::json!({
            "persona": "ANGRY_CUSTOMER",
            "company": "Acme",
            "role": "Support Lead",
            "stakes": "Churn",
            "goals": "Keep the account",
            "difficulty": 3
        }))
        .unwrap();

        assert_eq!(raw.persona_type.as_deref(), Some("ANGRY_CUSTOMER"));
        assert_eq!(raw.user_goal.as_deref(), Some("Keep the account"));

        let scenario = validate_scenario(&raw).unwrap();
        assert_eq!(scenario.persona_type, PersonaType::AngryCustomer);
        assert_eq!(scenario.difficulty.value(), 0.5);
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let scenario = validate_scenario(&complete_raw()).unwrap();
        let value = serde_json::to_value(&scenario).unwrap();
        assert_eq!(value["personaType"], "TOUGH_NEGOTIATOR");
        assert_eq!(value["userGoal"], "Hold the list price");
        assert_eq!(value["difficulty"], 0.8);
        assert!(value.get("sourceDocs").is_none());
    }

    #[test]
    fn question_plan_tracks_descriptor_difficulty() {
        let scenario = validate_scenario(&complete_raw()).unwrap();
        // 3 + floor(0.8 * 3) = 5
        assert_eq!(question_plan(&scenario).len(), 5);
    }
}
