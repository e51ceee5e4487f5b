//! Incremental scenario collection.
//!
//! A helper for conversational front ends that gather a scenario one field
//! at a time: ask for [`ScenarioDraft::next_field`], feed the free-text
//! answer to [`ScenarioDraft::apply_answer`], and finalize once complete.
//! The HTTP server takes whole scenarios and does not use it.

use crate::descriptor::{missing_fields, validate_scenario, RawScenario, ScenarioDescriptor};
use crate::error::{RequiredField, ValidationError};
use gauntlet_types::{PersonaType, PressureLevel};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// A scenario under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioDraft {
    raw: RawScenario,
}

impl ScenarioDraft {
    /// Starts a draft from whatever fields the caller already supplied.
    pub fn new(raw: RawScenario) -> Self {
        Self { raw }
    }

    /// The fields gathered so far.
    pub fn raw(&self) -> &RawScenario {
        &self.raw
    }

    /// Fields still to be collected, in asking order.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        missing_fields(&self.raw)
    }

    /// The next field to ask for, if any.
    pub fn next_field(&self) -> Option<RequiredField> {
        self.missing_fields().into_iter().next()
    }

    /// Whether every field has been collected.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Interprets a free-text answer for `field`.
    ///
    /// Persona answers match a catalogue label or display name anywhere in
    /// the text. Difficulty answers use the first number found; values above
    /// 1 are read on the legacy 1–5 scale and everything is clamped into
    /// range. Other fields take the trimmed text.
    ///
    /// Returns `false` when the answer could not be used, leaving the field
    /// missing so it is asked again.
    pub fn apply_answer(&mut self, field: RequiredField, answer: &str) -> bool {
        let answer = answer.trim();
        let accepted = match field {
            RequiredField::PersonaType => match match_persona(answer) {
                Some(persona) => {
                    self.raw.persona_type = Some(persona.as_str().to_string());
                    true
                }
                None => false,
            },
            RequiredField::Difficulty => match parse_difficulty(answer) {
                Some(level) => {
                    self.raw.difficulty = Some(level.value());
                    true
                }
                None => false,
            },
            _ if answer.is_empty() => false,
            RequiredField::Company => set(&mut self.raw.company, answer),
            RequiredField::Role => set(&mut self.raw.role, answer),
            RequiredField::Stakes => set(&mut self.raw.stakes, answer),
            RequiredField::UserGoal => set(&mut self.raw.user_goal, answer),
        };

        if accepted {
            tracing::debug!(field = field.as_str(), "scenario field collected");
        } else {
            tracing::debug!(field = field.as_str(), "scenario answer not usable");
        }
        accepted
    }

    /// Validates the collected fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if required fields are still missing or
    /// invalid.
    pub fn finalize(&self) -> Result<ScenarioDescriptor, ValidationError> {
        validate_scenario(&self.raw)
    }
}

fn set(slot: &mut Option<String>, answer: &str) -> bool {
    *slot = Some(answer.to_string());
    true
}

fn match_persona(answer: &str) -> Option<PersonaType> {
    let upper = answer.to_uppercase();
    let lower = answer.to_lowercase();
    PersonaType::ALL
        .into_iter()
        .find(|p| upper.contains(p.as_str()) || lower.contains(p.display_name()))
}

fn parse_difficulty(answer: &str) -> Option<PressureLevel> {
    let value: f64 = NUMBER.find(answer)?.as_str().parse().ok()?;
    if value > 1.0 {
        Some(PressureLevel::from_legacy(value))
    } else {
        Some(PressureLevel::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_matched_inside_sentence() {
        let mut draft = ScenarioDraft::default();
        assert!(draft.apply_answer(
            RequiredField::PersonaType,
            "Let's do a skeptical investor please"
        ));
        assert_eq!(draft.raw().persona_type.as_deref(), Some("SKEPTICAL_INVESTOR"));

        let mut draft = ScenarioDraft::default();
        assert!(draft.apply_answer(RequiredField::PersonaType, "ANGRY_CUSTOMER"));
        assert!(!draft.apply_answer(RequiredField::Company, "  "));
    }

    #[test]
    fn unknown_persona_left_missing() {
        let mut draft = ScenarioDraft::default();
        assert!(!draft.apply_answer(RequiredField::PersonaType, "a friendly neighbour"));
        assert_eq!(draft.next_field(), Some(RequiredField::PersonaType));
    }

    #[test]
    fn difficulty_answers_normalized() {
        let mut draft = ScenarioDraft::default();
        assert!(draft.apply_answer(RequiredField::Difficulty, "make it 0.9"));
        assert_eq!(draft.raw().difficulty, Some(0.9));

        assert!(draft.apply_answer(RequiredField::Difficulty, "level 3 out of 5"));
        assert_eq!(draft.raw().difficulty, Some(0.5));

        assert!(draft.apply_answer(RequiredField::Difficulty, "10"));
        assert_eq!(draft.raw().difficulty, Some(1.0));

        assert!(!draft.apply_answer(RequiredField::Difficulty, "hard"));
    }

    #[test]
    fn draft_walks_fields_in_order() {
        let mut draft = ScenarioDraft::default();
        let answers = [
            "demanding client",
            "Umbrella Corp",
            "Delivery Lead",
            "A seven-figure contract",
            "Commit to a realistic timeline",
            "2",
        ];

        for answer in answers {
            let field = draft.next_field().expect("field should be pending");
            assert!(draft.apply_answer(field, answer));
        }

        assert!(draft.is_complete());
        let scenario = draft.finalize().unwrap();
        assert_eq!(scenario.persona_type, PersonaType::DemandingClient);
        assert_eq!(scenario.difficulty.value(), 0.25);
    }

    #[test]
    fn incomplete_draft_fails_validation() {
        let draft = ScenarioDraft::new(RawScenario {
            company: Some("Hooli".to_string()),
            ..RawScenario::default()
        });
        assert!(!draft.is_complete());
        assert!(draft.finalize().is_err());
    }
}
