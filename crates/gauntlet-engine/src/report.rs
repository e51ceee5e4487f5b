//! Plain-text scorecard rendering.

use crate::scorecard::{Dimension, Scorecard};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Renders a scorecard as a human-readable report.
pub fn render_report(card: &Scorecard) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "PERFORMANCE SCORECARD");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Scenario: {} at {} ({})",
        card.scenario.persona_type.display_name(),
        card.scenario.company,
        card.scenario.role
    );
    let _ = writeln!(out, "Stakes: {}", card.scenario.stakes);
    let _ = writeln!(out, "Goal: {}", card.scenario.user_goal);
    let _ = writeln!(
        out,
        "Exchanges: {}  Pressure: {:.2} -> {:.2} ({} up, {} down)",
        card.total_exchanges,
        card.starting_pressure.value(),
        card.final_pressure.value(),
        card.escalations,
        card.deescalations
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall Score: {:.1}/100", card.scores.overall);
    let _ = writeln!(out);
    let _ = writeln!(out, "Breakdown:");
    for dimension in Dimension::ALL {
        let _ = writeln!(
            out,
            "  {:<14}{:>6.1}/100",
            format!("{}:", dimension.label()),
            card.scores.get(dimension)
        );
    }

    section(&mut out, &thin, "STRENGTHS", "+", &card.feedback.strengths);
    section(&mut out, &thin, "AREAS FOR IMPROVEMENT", "-", &card.feedback.weaknesses);
    numbered(&mut out, &thin, "COACHING POINTS", &card.feedback.recommendations);
    section(&mut out, &thin, "KEY MOMENTS", "*", &card.feedback.key_moments);

    if !card.commitments.is_empty() {
        numbered(&mut out, &thin, "COMMITMENTS", &card.commitments);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    out
}

fn section(out: &mut String, rule: &str, title: &str, bullet: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{rule}");
    for item in items {
        let _ = writeln!(out, "  {bullet} {item}");
    }
}

fn numbered(out: &mut String, rule: &str, title: &str, items: &[String]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{rule}");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  {}. {item}", i + 1);
    }
}
