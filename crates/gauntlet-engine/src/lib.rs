//! Difficulty-adaptive response scoring.
//!
//! Three pieces cooperate over one conversation:
//!
//! - [`ResponseClassifier`] tags each utterance as vague, deflecting, or
//!   carrying a concrete commitment. It is stateless and shared by all
//!   sessions.
//! - [`PressureController`] raises or lowers the session's pressure level
//!   from the running classifications.
//! - [`aggregate_scorecard`] reduces a [`SessionState`] to a [`Scorecard`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use gauntlet_engine::{aggregate_scorecard, PressureConfig, ResponseClassifier, SessionState};
//!
//! let classifier = ResponseClassifier::default();
//! let mut session = SessionState::new(scenario, PressureConfig::default());
//! let turn = session.append_utterance(&classifier, "I will ship it by Friday", Utc::now());
//! let card = aggregate_scorecard(&session);
//! ```

pub mod classifier;
pub mod feedback;
mod lexicon;
pub mod pressure;
pub mod report;
pub mod scorecard;
pub mod session;

pub use classifier::{ClassificationResult, ClassifierConfig, ResponseClassifier};
pub use feedback::{generate_feedback, Feedback};
pub use lexicon::Lexicon;
pub use pressure::{PressureConfig, PressureController, PressureDirection, PressureEvent};
pub use report::render_report;
pub use scorecard::{aggregate_scorecard, compute_scores, Dimension, Scorecard, Scores};
pub use session::{SessionCounters, SessionState, TranscriptEntry, TurnOutcome, Utterance};
