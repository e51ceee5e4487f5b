//! Session scoring.
//!
//! All scores are on a `0..=100` scale. With `t` exchanges:
//!
//! - clarity is `100 * (1 - vague / t)`
//! - confidence is `100 * (1 - deflection / t)`
//! - commitment is `100 * (1 - (1 - commitments / t)^2)`, which rewards the
//!   first few commitments most and saturates at 100
//! - adaptability is 100 without escalation; otherwise a session that
//!   de-escalated after its first escalation always outscores one that
//!   never did
//! - overall is the unweighted mean of the four
//!
//! A session with no exchanges scores 50 everywhere.

use crate::feedback::{generate_feedback, Feedback};
use crate::pressure::{PressureDirection, PressureEvent};
use crate::session::{SessionCounters, SessionState};
use gauntlet_scenario::ScenarioDescriptor;
use gauntlet_types::PressureLevel;
use serde::{Deserialize, Serialize};

pub const NEUTRAL_SCORE: f64 = 50.0;
pub const MAX_SCORE: f64 = 100.0;

const RECOVERED_CEILING: f64 = 90.0;
const RECOVERED_FLOOR: f64 = 55.0;
const UNRECOVERED_CEILING: f64 = 50.0;
const ESCALATION_PENALTY: f64 = 10.0;
const UNSETTLED_PENALTY: f64 = 5.0;

/// Score dimensions, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Clarity,
    Confidence,
    Commitment,
    Adaptability,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Clarity,
        Dimension::Confidence,
        Dimension::Commitment,
        Dimension::Adaptability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clarity => "Clarity",
            Self::Confidence => "Confidence",
            Self::Commitment => "Commitment",
            Self::Adaptability => "Adaptability",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub clarity: f64,
    pub confidence: f64,
    pub commitment: f64,
    pub adaptability: f64,
    pub overall: f64,
}

impl Scores {
    pub fn neutral() -> Self {
        Self {
            clarity: NEUTRAL_SCORE,
            confidence: NEUTRAL_SCORE,
            commitment: NEUTRAL_SCORE,
            adaptability: NEUTRAL_SCORE,
            overall: NEUTRAL_SCORE,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Confidence => self.confidence,
            Dimension::Commitment => self.commitment,
            Dimension::Adaptability => self.adaptability,
        }
    }
}

/// Final assessment of a session.
///
/// Carries no identifiers or timestamps: the same session state always
/// aggregates to the same scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub scenario: ScenarioDescriptor,
    pub scores: Scores,
    pub feedback: Feedback,
    pub total_exchanges: u64,
    pub counters: SessionCounters,
    pub starting_pressure: PressureLevel,
    pub final_pressure: PressureLevel,
    pub escalations: u64,
    pub deescalations: u64,
    /// Every pressure adjustment, in order.
    pub pressure_events: Vec<PressureEvent>,
    pub commitments: Vec<String>,
}

fn ratio(count: u64, total: u64) -> f64 {
    (count.min(total) as f64) / (total as f64)
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, MAX_SCORE)
}

/// Adaptability from the pressure history.
pub fn adaptability_score(events: &[PressureEvent]) -> f64 {
    let Some(first) = events
        .iter()
        .position(|e| e.direction == PressureDirection::Escalated)
    else {
        return MAX_SCORE;
    };
    let escalations = events
        .iter()
        .filter(|e| e.direction == PressureDirection::Escalated)
        .count() as f64;
    let penalty = ESCALATION_PENALTY * (escalations - 1.0);

    let recovered = events[first + 1..]
        .iter()
        .any(|e| e.direction == PressureDirection::Deescalated);
    if !recovered {
        return (UNRECOVERED_CEILING - penalty).clamp(0.0, UNRECOVERED_CEILING);
    }

    let ends_escalated = events
        .last()
        .is_some_and(|e| e.direction == PressureDirection::Escalated);
    let unsettled = if ends_escalated { UNSETTLED_PENALTY } else { 0.0 };
    (RECOVERED_CEILING - penalty - unsettled).clamp(RECOVERED_FLOOR, RECOVERED_CEILING)
}

/// Scores for `total` exchanges with the given counters and history.
pub fn compute_scores(total: u64, counters: SessionCounters, events: &[PressureEvent]) -> Scores {
    if total == 0 {
        return Scores::neutral();
    }

    let clarity = clamp_score(MAX_SCORE * (1.0 - ratio(counters.vague, total)));
    let confidence = clamp_score(MAX_SCORE * (1.0 - ratio(counters.deflection, total)));
    let missed = 1.0 - ratio(counters.commitment, total);
    let commitment = clamp_score(MAX_SCORE * (1.0 - missed * missed));
    let adaptability = adaptability_score(events);
    let overall = (clarity + confidence + commitment + adaptability) / 4.0;

    Scores {
        clarity,
        confidence,
        commitment,
        adaptability,
        overall,
    }
}

/// Aggregates a finished (or in-progress) session into a scorecard.
pub fn aggregate_scorecard(state: &SessionState) -> Scorecard {
    let total = state.total_exchanges();
    let counters = state.counters();
    let pressure = state.pressure();
    let scores = compute_scores(total, counters, pressure.events());
    let feedback = generate_feedback(total, &scores, counters, pressure.events());

    tracing::debug!(
        total_exchanges = total,
        overall = scores.overall,
        "scorecard aggregated"
    );

    Scorecard {
        scenario: state.scenario().clone(),
        scores,
        feedback,
        total_exchanges: total,
        counters,
        starting_pressure: pressure.start(),
        final_pressure: pressure.level(),
        escalations: pressure.escalations() as u64,
        deescalations: pressure.deescalations() as u64,
        pressure_events: pressure.events().to_vec(),
        commitments: state.commitments().map(str::to_owned).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ordinal: u64, direction: PressureDirection) -> PressureEvent {
        PressureEvent {
            ordinal,
            direction,
            from: PressureLevel::default(),
            to: PressureLevel::default(),
        }
    }

    fn counters(vague: u64, deflection: u64, commitment: u64) -> SessionCounters {
        SessionCounters {
            vague,
            deflection,
            commitment,
        }
    }

    #[test]
    fn empty_session_is_neutral() {
        assert_eq!(compute_scores(0, counters(0, 0, 0), &[]), Scores::neutral());
    }

    #[test]
    fn clarity_falls_with_each_vague_reply() {
        let mut previous = f64::INFINITY;
        for vague in 0..=10 {
            let clarity = compute_scores(10, counters(vague, 0, 0), &[]).clarity;
            assert!(clarity < previous);
            previous = clarity;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn commitment_rises_with_each_commitment() {
        let mut previous = -1.0;
        for commitments in 0..=8 {
            let score = compute_scores(8, counters(0, 0, commitments), &[]).commitment;
            assert!(score > previous);
            previous = score;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn overall_is_mean_of_components() {
        let scores = compute_scores(
            4,
            counters(1, 2, 1),
            &[event(2, PressureDirection::Escalated)],
        );
        let mean =
            (scores.clarity + scores.confidence + scores.commitment + scores.adaptability) / 4.0;
        assert!((scores.overall - mean).abs() < 1e-9);
        assert_eq!(scores.clarity, 75.0);
        assert_eq!(scores.confidence, 50.0);
        assert_eq!(scores.commitment, 43.75);
        assert_eq!(scores.adaptability, 50.0);
    }

    #[test]
    fn adaptability_without_escalation_is_full() {
        assert_eq!(adaptability_score(&[]), 100.0);
        assert_eq!(
            adaptability_score(&[event(2, PressureDirection::Deescalated)]),
            100.0
        );
    }

    #[test]
    fn recovery_always_beats_no_recovery() {
        use PressureDirection::{Deescalated as D, Escalated as E};
        let recovered = [
            vec![E, D],
            vec![E, D, E],
            vec![E, E, E, E, E, E, D, E],
        ];
        let unrecovered = [vec![E], vec![D, E], vec![E, E]];

        let worst_recovered = recovered
            .iter()
            .map(|dirs| history(dirs))
            .map(|h| adaptability_score(&h))
            .fold(f64::INFINITY, f64::min);
        let best_unrecovered = unrecovered
            .iter()
            .map(|dirs| history(dirs))
            .map(|h| adaptability_score(&h))
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(worst_recovered > best_unrecovered);
    }

    #[test]
    fn deescalation_before_escalation_is_not_recovery() {
        use PressureDirection::{Deescalated as D, Escalated as E};
        assert_eq!(adaptability_score(&history(&[D, E])), 50.0);
        assert_eq!(adaptability_score(&history(&[E, D])), 90.0);
    }

    fn history(directions: &[PressureDirection]) -> Vec<PressureEvent> {
        directions
            .iter()
            .enumerate()
            .map(|(i, d)| event(i as u64 + 1, *d))
            .collect()
    }
}
