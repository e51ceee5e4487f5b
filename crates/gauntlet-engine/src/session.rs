//! Per-session state: transcript, counters, pressure.

use crate::classifier::{ClassificationResult, ResponseClassifier};
use crate::pressure::{PressureConfig, PressureController, PressureEvent};
use chrono::{DateTime, Utc};
use gauntlet_scenario::ScenarioDescriptor;
use gauntlet_types::{PressureBand, PressureLevel};
use serde::{Deserialize, Serialize};

/// One user turn, ordinals starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub ordinal: u64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub utterance: Utterance,
    pub classification: ClassificationResult,
    /// Pressure after this utterance was observed.
    pub pressure_after: PressureLevel,
}

/// Lifetime counters. Never decrease and never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounters {
    pub vague: u64,
    pub deflection: u64,
    pub commitment: u64,
}

/// What one appended utterance produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub utterance: Utterance,
    pub classification: ClassificationResult,
    pub pressure: PressureLevel,
    pub band: PressureBand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<PressureEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    scenario: ScenarioDescriptor,
    transcript: Vec<TranscriptEntry>,
    counters: SessionCounters,
    pressure: PressureController,
}

impl SessionState {
    /// Opens a session at the scenario's difficulty.
    pub fn new(scenario: ScenarioDescriptor, config: PressureConfig) -> Self {
        let pressure = PressureController::new(config, Some(scenario.difficulty));
        Self {
            scenario,
            transcript: Vec::new(),
            counters: SessionCounters::default(),
            pressure,
        }
    }

    pub fn scenario(&self) -> &ScenarioDescriptor {
        &self.scenario
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn pressure(&self) -> &PressureController {
        &self.pressure
    }

    pub fn level(&self) -> PressureLevel {
        self.pressure.level()
    }

    pub fn total_exchanges(&self) -> u64 {
        self.transcript.len() as u64
    }

    /// Commitments extracted so far, in utterance order.
    pub fn commitments(&self) -> impl Iterator<Item = &str> {
        self.transcript
            .iter()
            .filter_map(|entry| entry.classification.extracted_commitment.as_deref())
    }

    /// Classifies `text` and feeds it through the pressure controller.
    pub fn append_utterance(
        &mut self,
        classifier: &ResponseClassifier,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> TurnOutcome {
        let text = text.into();
        let classification = classifier.classify(&text);
        self.append_classified(text, classification, timestamp)
    }

    /// Appends an utterance whose classification is already known.
    pub fn append_classified(
        &mut self,
        text: String,
        classification: ClassificationResult,
        timestamp: DateTime<Utc>,
    ) -> TurnOutcome {
        let ordinal = self.total_exchanges() + 1;
        if classification.is_vague {
            self.counters.vague = self.counters.vague.saturating_add(1);
        }
        if classification.is_deflection {
            self.counters.deflection = self.counters.deflection.saturating_add(1);
        }
        if classification.has_commitment() {
            self.counters.commitment = self.counters.commitment.saturating_add(1);
        }

        let event = self.pressure.observe(ordinal, &classification);
        let pressure = self.pressure.level();
        let utterance = Utterance {
            ordinal,
            text,
            timestamp,
        };
        self.transcript.push(TranscriptEntry {
            utterance: utterance.clone(),
            classification: classification.clone(),
            pressure_after: pressure,
        });

        TurnOutcome {
            utterance,
            classification,
            pressure,
            band: pressure.band(),
            event,
        }
    }
}
