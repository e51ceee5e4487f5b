//! Per-utterance classification: vague, deflecting, committed.

use crate::lexicon::{is_sentence_end, tokenize, Lexicon, PhraseMatch, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest extracted commitment, in characters.
pub const MAX_COMMITMENT_CHARS: usize = 200;

pub const DEFAULT_VAGUE_PHRASES: &[&str] = &[
    "maybe",
    "perhaps",
    "i think",
    "i guess",
    "i believe",
    "i feel like",
    "probably",
    "possibly",
    "hopefully",
    "sort of",
    "kind of",
    "somewhat",
    "might",
    "could be",
    "not sure",
    "i'm not sure",
    "we'll see",
    "it depends",
    "more or less",
    "roughly",
    "around",
    "approximately",
    "try to",
    "hope to",
    "at some point",
    "sometime",
    "eventually",
];

pub const DEFAULT_DEFLECTION_PHRASES: &[&str] = &[
    "let's talk about",
    "let's focus on",
    "what about",
    "how about",
    "can we discuss",
    "but first",
    "before we get to that",
    "back to",
    "the real issue is",
    "the real question is",
    "more importantly",
    "that's not the point",
    "that's not really the issue",
    "instead",
    "anyway",
    "moving on",
    "on another note",
    "speaking of",
];

pub const DEFAULT_COMMITMENT_PHRASES: &[&str] = &[
    "i will",
    "i'll",
    "i commit to",
    "i promise",
    "i guarantee",
    "we will",
    "we'll",
];

/// `by <date or time>` deadlines. Matches always begin at the word `by`.
static DEADLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        \bby\s+(?:the\s+)?
        (?:
            end\s+of\s+(?:the\s+)?(?:day|week|month|quarter|year|sprint)
          | (?:next|this)\s+(?:week|month|quarter|year|sprint
                |monday|tuesday|wednesday|thursday|friday|saturday|sunday)
          | monday|tuesday|wednesday|thursday|friday|saturday|sunday
          | today|tomorrow|tonight|noon|midnight|eod|eow|eom
          | q[1-4]
          | january|february|march|april|may|june|july|august
          | september|october|november|december
          | jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec
          | \d{1,2}(?::\d{2})?\s*(?:am|pm)
          | \d{1,2}:\d{2}
          | \d{1,2}(?:st|nd|rd|th)
          | \d{4}-\d{2}-\d{2}
          | \d{1,2}/\d{1,2}(?:/\d{2,4})?
        )\b",
    )
    .expect("deadline pattern is valid")
});

/// Caller-supplied lexicon additions, merged into the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub extra_vague: Vec<String>,
    #[serde(default)]
    pub extra_deflection: Vec<String>,
    #[serde(default)]
    pub extra_commitment: Vec<String>,
}

/// Outcome of classifying one utterance.
///
/// When `extracted_commitment` is present, `is_vague` is always `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub is_vague: bool,
    pub is_deflection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_commitment: Option<String>,
}

impl ClassificationResult {
    pub fn has_commitment(&self) -> bool {
        self.extracted_commitment.is_some()
    }

    /// Neither vague, deflecting, nor committed.
    pub fn is_neutral(&self) -> bool {
        !self.is_vague && !self.is_deflection && !self.has_commitment()
    }
}

/// A commitment cue: phrase marker or deadline.
#[derive(Debug, Clone, Copy)]
struct Marker {
    token: usize,
    byte: usize,
}

/// Lexicon-driven classifier. Stateless once built; share it freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseClassifier {
    vague: Lexicon,
    deflection: Lexicon,
    commitment: Lexicon,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl ResponseClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let build = |defaults: &[&str], extra: &[String]| {
            Lexicon::new(
                defaults
                    .iter()
                    .copied()
                    .chain(extra.iter().map(String::as_str)),
            )
        };
        Self {
            vague: build(DEFAULT_VAGUE_PHRASES, &config.extra_vague),
            deflection: build(DEFAULT_DEFLECTION_PHRASES, &config.extra_deflection),
            commitment: build(DEFAULT_COMMITMENT_PHRASES, &config.extra_commitment),
        }
    }

    pub fn vague_lexicon(&self) -> &Lexicon {
        &self.vague
    }

    pub fn deflection_lexicon(&self) -> &Lexicon {
        &self.deflection
    }

    pub fn commitment_lexicon(&self) -> &Lexicon {
        &self.commitment
    }

    /// Classifies one utterance. Never fails; empty text is neutral.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return ClassificationResult::default();
        }

        let hedges = self.vague.find(&tokens);
        let is_deflection = !self.deflection.find(&tokens).is_empty();

        let extracted_commitment = self
            .markers(text, &tokens)
            .into_iter()
            .filter(|marker| !is_hedged(marker, &hedges, &tokens))
            .min_by_key(|marker| marker.byte)
            .map(|marker| extract_sentence(text, marker.byte))
            .filter(|commitment| !commitment.is_empty());

        let result = ClassificationResult {
            is_vague: !hedges.is_empty() && extracted_commitment.is_none(),
            is_deflection,
            extracted_commitment,
        };
        tracing::debug!(
            is_vague = result.is_vague,
            is_deflection = result.is_deflection,
            has_commitment = result.has_commitment(),
            "utterance classified"
        );
        result
    }

    fn markers(&self, text: &str, tokens: &[Token]) -> Vec<Marker> {
        let mut markers: Vec<Marker> = self
            .commitment
            .find(tokens)
            .into_iter()
            .map(|m| Marker {
                token: m.start,
                byte: tokens[m.start].start,
            })
            .collect();

        for deadline in DEADLINE.find_iter(text) {
            if let Some(token) = tokens.iter().position(|t| t.start == deadline.start()) {
                markers.push(Marker {
                    token,
                    byte: deadline.start(),
                });
            }
        }
        markers
    }
}

/// A marker is hedged when a vague phrase starts at or before it in its
/// sentence. `we'll see` hedges its own `we'll`.
fn is_hedged(marker: &Marker, hedges: &[PhraseMatch], tokens: &[Token]) -> bool {
    let sentence = tokens[marker.token].sentence;
    hedges
        .iter()
        .any(|h| h.start <= marker.token && tokens[h.start].sentence == sentence)
}

/// Text from `start` to the end of its sentence, trimmed and capped.
fn extract_sentence(text: &str, start: usize) -> String {
    let rest = &text[start..];
    let end = rest
        .char_indices()
        .find(|&(idx, c)| is_sentence_end(rest, idx, c))
        .map_or(rest.len(), |(idx, _)| idx);
    let sentence = rest[..end].trim_end_matches(|c: char| c.is_whitespace() || c == ',');

    match sentence.char_indices().nth(MAX_COMMITMENT_CHARS) {
        Some((cut, _)) => sentence[..cut].trim_end().to_string(),
        None => sentence.to_string(),
    }
}
