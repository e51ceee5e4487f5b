//! Coaching feedback derived from scores.

use crate::pressure::{PressureDirection, PressureEvent};
use crate::scorecard::{Dimension, Scores};
use crate::session::SessionCounters;
use serde::{Deserialize, Serialize};

/// Scores below this are weaknesses.
pub const WEAKNESS_BELOW: f64 = 50.0;
/// Scores at or above this are strengths.
pub const STRENGTH_FROM: f64 = 80.0;
/// Feedback always carries exactly this many recommendations.
pub const RECOMMENDATION_COUNT: usize = 3;

const GENERAL_TIPS: [&str; RECOMMENDATION_COUNT] = [
    "Continue practicing with higher-pressure scenarios",
    "Prepare two or three concrete commitments before the conversation starts",
    "Review the transcript and rewrite your weakest answer",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub key_moments: Vec<String>,
}

fn strength(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "Clear, direct answers without hedging",
        Dimension::Confidence => "Stayed on the question instead of changing the subject",
        Dimension::Commitment => "Made specific commitments",
        Dimension::Adaptability => "Handled pressure well",
    }
}

fn weakness(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "Frequent vague or hedged answers",
        Dimension::Confidence => "Deflected difficult questions",
        Dimension::Commitment => "Few concrete commitments",
        Dimension::Adaptability => "Struggled to recover once pressure rose",
    }
}

fn improvement(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => {
            "Replace hedges like \"maybe\" and \"I think\" with specific facts and numbers"
        }
        Dimension::Confidence => "Answer the question that was asked before raising other topics",
        Dimension::Commitment => "Commit to concrete actions with owners and dates",
        Dimension::Adaptability => {
            "When pushed, respond with a firm commitment rather than another qualification"
        }
    }
}

fn maintain(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "Keep answering with the same precision",
        Dimension::Confidence => "Keep addressing hard questions head-on",
        Dimension::Commitment => "Keep tying commitments to explicit deadlines",
        Dimension::Adaptability => "Keep steadying the conversation when pressure rises",
    }
}

/// Builds feedback for a scored session.
///
/// Recommendations are ordered weakest dimension first, then middling ones,
/// then reinforcement of strengths, padded with general tips to exactly
/// [`RECOMMENDATION_COUNT`].
pub fn generate_feedback(
    total: u64,
    scores: &Scores,
    counters: SessionCounters,
    events: &[PressureEvent],
) -> Feedback {
    if total == 0 {
        return Feedback {
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            recommendations: GENERAL_TIPS.iter().map(|s| s.to_string()).collect(),
            key_moments: vec!["No exchanges were recorded".to_string()],
        };
    }

    let mut ranked: Vec<(Dimension, f64)> = Dimension::ALL
        .iter()
        .map(|&d| (d, scores.get(d)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let weak: Vec<Dimension> = ranked
        .iter()
        .filter(|(_, s)| *s < WEAKNESS_BELOW)
        .map(|(d, _)| *d)
        .collect();
    let middling = ranked
        .iter()
        .filter(|(_, s)| (WEAKNESS_BELOW..STRENGTH_FROM).contains(s))
        .map(|(d, _)| *d);
    let strong: Vec<Dimension> = ranked
        .iter()
        .rev()
        .filter(|(_, s)| *s >= STRENGTH_FROM)
        .map(|(d, _)| *d)
        .collect();

    let recommendations = weak
        .iter()
        .copied()
        .chain(middling)
        .map(improvement)
        .chain(strong.iter().copied().map(maintain))
        .chain(GENERAL_TIPS)
        .take(RECOMMENDATION_COUNT)
        .map(str::to_string)
        .collect();

    let strengths: Vec<String> = Dimension::ALL
        .iter()
        .filter(|d| strong.contains(*d))
        .map(|&d| strength(d).to_string())
        .collect();
    let weaknesses: Vec<String> = Dimension::ALL
        .iter()
        .filter(|d| weak.contains(*d))
        .map(|&d| weakness(d).to_string())
        .collect();

    Feedback {
        strengths,
        weaknesses,
        recommendations,
        key_moments: key_moments(counters, events),
    }
}

fn key_moments(counters: SessionCounters, events: &[PressureEvent]) -> Vec<String> {
    let mut moments = Vec::new();
    if counters.commitment > 0 {
        moments.push(format!(
            "Made {} specific commitment{}",
            counters.commitment,
            plural(counters.commitment)
        ));
    }
    if counters.vague > 0 {
        moments.push(format!(
            "Gave {} vague response{}",
            counters.vague,
            plural(counters.vague)
        ));
    }
    if counters.deflection > 0 {
        moments.push(format!(
            "Deflected {} time{}",
            counters.deflection,
            plural(counters.deflection)
        ));
    }
    for event in events {
        let moment = match event.direction {
            PressureDirection::Escalated => "Pressure escalated",
            PressureDirection::Deescalated => "Pressure eased",
        };
        moments.push(format!(
            "{moment} after exchange {} ({:.2} -> {:.2})",
            event.ordinal,
            event.from.value(),
            event.to.value()
        ));
    }
    if moments.is_empty() {
        moments.push("Review the full transcript for improvement opportunities".to_string());
    }
    moments
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
