//! Adaptive pressure control.
//!
//! The controller watches the stream of classifications and moves the
//! pressure level in fixed steps. An episode is the run of utterances since
//! the last adjustment; two vague or two deflecting replies inside one
//! episode escalate, two consecutive commitments de-escalate. Escalation is
//! checked first. Every adjustment starts a fresh episode.

use crate::classifier::ClassificationResult;
use gauntlet_types::{PressureBand, PressureLevel};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STEP: f64 = 0.25;
pub const DEFAULT_ESCALATE_AFTER: u32 = 2;
pub const DEFAULT_DEESCALATE_AFTER: u32 = 2;

fn default_step() -> f64 {
    DEFAULT_STEP
}

fn default_start() -> f64 {
    gauntlet_types::DEFAULT_PRESSURE
}

fn default_escalate_after() -> u32 {
    DEFAULT_ESCALATE_AFTER
}

fn default_deescalate_after() -> u32 {
    DEFAULT_DEESCALATE_AFTER
}

/// Tuning for [`PressureController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureConfig {
    /// Size of one adjustment on the `[0, 1]` scale.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Starting level when the scenario does not set one.
    #[serde(default = "default_start")]
    pub default_start: f64,
    /// Vague (or deflecting) replies per episode that trigger escalation.
    #[serde(default = "default_escalate_after")]
    pub escalate_after: u32,
    /// Consecutive commitments that trigger de-escalation.
    #[serde(default = "default_deescalate_after")]
    pub deescalate_after: u32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            default_start: default_start(),
            escalate_after: default_escalate_after(),
            deescalate_after: default_deescalate_after(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressureDirection {
    Escalated,
    Deescalated,
}

impl PressureDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Escalated => "ESCALATED",
            Self::Deescalated => "DEESCALATED",
        }
    }
}

/// One pressure adjustment. Recorded even when clamping leaves the level
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureEvent {
    /// Ordinal of the utterance that triggered the adjustment.
    pub ordinal: u64,
    pub direction: PressureDirection,
    pub from: PressureLevel,
    pub to: PressureLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Episode {
    vague: u32,
    deflection: u32,
    commitment_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureController {
    #[serde(skip)]
    config: PressureConfig,
    start: PressureLevel,
    level: PressureLevel,
    episode: Episode,
    events: Vec<PressureEvent>,
}

impl PressureController {
    /// Starts at `start`, or at the configured default when absent.
    pub fn new(config: PressureConfig, start: Option<PressureLevel>) -> Self {
        let start = start.unwrap_or_else(|| PressureLevel::new(config.default_start));
        Self {
            config,
            start,
            level: start,
            episode: Episode::default(),
            events: Vec::new(),
        }
    }

    pub fn level(&self) -> PressureLevel {
        self.level
    }

    pub fn start(&self) -> PressureLevel {
        self.start
    }

    pub fn band(&self) -> PressureBand {
        self.level.band()
    }

    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    /// Adjustment history, oldest first.
    pub fn events(&self) -> &[PressureEvent] {
        &self.events
    }

    pub fn escalations(&self) -> usize {
        self.count(PressureDirection::Escalated)
    }

    pub fn deescalations(&self) -> usize {
        self.count(PressureDirection::Deescalated)
    }

    fn count(&self, direction: PressureDirection) -> usize {
        self.events
            .iter()
            .filter(|e| e.direction == direction)
            .count()
    }

    /// Feeds one classification. Returns the adjustment it caused, if any.
    pub fn observe(&mut self, ordinal: u64, result: &ClassificationResult) -> Option<PressureEvent> {
        let episode = &mut self.episode;
        if result.is_vague {
            episode.vague += 1;
        }
        if result.is_deflection {
            episode.deflection += 1;
        }
        if result.is_vague || result.is_deflection {
            episode.commitment_streak = 0;
        } else if result.has_commitment() {
            episode.commitment_streak += 1;
        }

        let threshold = self.config.escalate_after.max(1);
        let direction = if episode.vague >= threshold || episode.deflection >= threshold {
            PressureDirection::Escalated
        } else if episode.commitment_streak >= self.config.deescalate_after.max(1) {
            PressureDirection::Deescalated
        } else {
            return None;
        };

        let from = self.level;
        let to = match direction {
            PressureDirection::Escalated => from.raised(self.config.step),
            PressureDirection::Deescalated => from.lowered(self.config.step),
        };
        let event = PressureEvent {
            ordinal,
            direction,
            from,
            to,
        };

        self.level = to;
        self.episode = Episode::default();
        self.events.push(event);
        tracing::info!(
            ordinal,
            direction = direction.as_str(),
            from = from.value(),
            to = to.value(),
            band = %to.band(),
            "pressure adjusted"
        );
        Some(event)
    }
}
