//! Persona catalogue templates and question plans.
//!
//! The persona-prompt layer lives outside this workspace; it consumes these
//! templates and the question plan as structured data.

use crate::descriptor::ScenarioDescriptor;
use gauntlet_types::PersonaType;
use serde::Serialize;

/// Fewest questions in a plan (difficulty 0).
const MIN_QUESTIONS: usize = 3;

/// Most questions in a plan (difficulty 1).
const MAX_QUESTIONS: usize = 6;

/// Static description of how a persona behaves and what success looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaTemplate {
    pub persona: PersonaType,
    pub description: &'static str,
    pub key_behaviors: &'static [&'static str],
    pub success_criteria: &'static [&'static str],
}

/// Returns the catalogue entry for a persona.
pub fn persona_template(persona: PersonaType) -> PersonaTemplate {
    let (description, key_behaviors, success_criteria): (
        &'static str,
        &'static [&'static str],
        &'static [&'static str],
    ) = match persona {
        PersonaType::AngryCustomer => (
            "Frustrated customer demanding immediate resolution",
            &[
                "Express frustration and urgency",
                "Demand specific timelines",
                "Question competence when answers are vague",
                "Escalate when deflected",
            ],
            &[
                "Clear resolution timeline provided",
                "Specific action items committed",
                "Customer concerns acknowledged",
            ],
        ),
        PersonaType::EliteInterviewer => (
            "Senior interviewer testing technical and cultural fit",
            &[
                "Ask probing technical questions",
                "Challenge assumptions",
                "Test depth of knowledge",
                "Evaluate communication clarity",
            ],
            &[
                "Clear, confident answers",
                "Demonstrated expertise",
                "Sound problem-solving approach",
            ],
        ),
        PersonaType::ToughNegotiator => (
            "Experienced negotiator seeking the best deal",
            &[
                "Push for concessions",
                "Question value propositions",
                "Test boundaries",
                "Seek leverage",
            ],
            &[
                "Value articulated clearly",
                "Concessions made strategically",
                "Boundaries maintained",
            ],
        ),
        PersonaType::SkepticalInvestor => (
            "Investor questioning business fundamentals",
            &[
                "Demand data and metrics",
                "Challenge assumptions",
                "Question market fit",
                "Test business acumen",
            ],
            &[
                "Data-driven responses",
                "Clear market understanding",
                "Realistic projections",
            ],
        ),
        PersonaType::DemandingClient => (
            "High-value client with strict requirements",
            &[
                "Set high expectations",
                "Demand guarantees",
                "Test reliability",
                "Require detailed planning",
            ],
            &[
                "Specific deliverables outlined",
                "Realistic commitments made",
                "Risk mitigation addressed",
            ],
        ),
    };

    PersonaTemplate {
        persona,
        description,
        key_behaviors,
        success_criteria,
    }
}

/// Number of planned questions for a unit-scale difficulty: `3 + floor(d * 3)`.
fn question_count(difficulty: f64) -> usize {
    let extra = (difficulty.clamp(0.0, 1.0) * 3.0).floor() as usize;
    (MIN_QUESTIONS + extra).min(MAX_QUESTIONS)
}

/// Builds the persona's question plan for a scenario.
///
/// Harder scenarios get more questions, from three at difficulty 0 up to six
/// at difficulty 1. Questions are interpolated with the scenario's company,
/// role and stakes.
pub fn question_plan(scenario: &ScenarioDescriptor) -> Vec<String> {
    let company = scenario.company.as_str();
    let role = scenario.role.as_str();
    let stakes = scenario.stakes.as_str();

    let questions: [String; MAX_QUESTIONS] = match scenario.persona_type {
        PersonaType::EliteInterviewer => [
            format!("What have you actually achieved as a {role}? Name specific results."),
            "Walk me through a time you failed. What broke, and how did you recover?".to_string(),
            format!("Why {company}? What makes us different from your other options?"),
            "Where will you be in five years? Be specific.".to_string(),
            "Tell me about a hard decision you made with incomplete information.".to_string(),
            "What is your biggest weakness, and what are you doing about it?".to_string(),
        ],
        PersonaType::AngryCustomer => [
            "This is unacceptable. How are you going to fix it right now?".to_string(),
            "I've been waiting for weeks. What's the excuse this time?".to_string(),
            format!("Why should I trust {company} after you've already let me down?"),
            "What guarantee do I have that this won't happen again?".to_string(),
            "I'm talking to your competitors. Why shouldn't I switch?".to_string(),
            "Give me one reason not to cancel my contract today.".to_string(),
        ],
        PersonaType::ToughNegotiator => [
            "Your price is too high. What are you going to do about it?".to_string(),
            "I need concrete numbers. What's your best offer?".to_string(),
            "Your competitor offered better terms. Match them or lose the deal.".to_string(),
            "What's your walk-away point? Are we even in the same ballpark?".to_string(),
            format!("Show me the return. Why is {company} worth the investment?"),
            "What concessions can you make to close this today?".to_string(),
        ],
        PersonaType::SkepticalInvestor => [
            "Your market size claims look inflated. Show me the data.".to_string(),
            "What does it cost you to acquire a customer, and why is that sustainable?"
                .to_string(),
            "Who are your competitors, and why will you win?".to_string(),
            "Your burn rate worries me. When are you profitable?".to_string(),
            "What happens if your key assumption turns out to be wrong?".to_string(),
            format!("Why is your team, with you as {role}, the one to execute this?"),
        ],
        PersonaType::DemandingClient => [
            format!("I expect {stakes}. Can you deliver, or should I look elsewhere?"),
            "Walk me through your quality process. Convince me nothing gets dropped."
                .to_string(),
            "I need weekly updates. What's your communication plan?".to_string(),
            "What happens when things go wrong? Show me the contingency plan.".to_string(),
            "Your timeline looks optimistic. What if you're late?".to_string(),
            "I'm paying premium rates. What premium value am I getting?".to_string(),
        ],
    };

    let count = question_count(scenario.difficulty.value());
    questions.into_iter().take(count).collect()
}
