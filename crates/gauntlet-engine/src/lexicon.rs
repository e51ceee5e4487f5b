//! Word-level phrase matching.
//!
//! Text is split into lowercase word tokens (letters, digits and inner
//! apostrophes) tagged with their byte span and sentence index. Phrases are
//! tokenized the same way and matched as contiguous token runs within one
//! sentence, so `"probably"` never fires on `"probability"`.

use std::collections::HashMap;

/// One word of an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    /// Lowercased text with typographic apostrophes folded to `'`.
    pub text: String,
    /// Byte offset of the first character in the source text.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Index of the sentence containing this token.
    pub sentence: usize,
}

/// A phrase occurrence, as a half-open token range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhraseMatch {
    pub start: usize,
    pub end: usize,
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Whether the character at `idx` ends a sentence.
///
/// `!`, `?`, `;` and newlines always do. A period does only when followed by
/// whitespace or the end of the text, so `2.5` and `e.g` stay intact.
pub(crate) fn is_sentence_end(text: &str, idx: usize, c: char) -> bool {
    match c {
        '!' | '?' | ';' | '\n' => true,
        '.' => text[idx + c.len_utf8()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace),
        _ => false,
    }
}

pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut sentence = 0;
    let mut current: Option<Token> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let next_is_alnum = chars.peek().is_some_and(|&(_, n)| n.is_alphanumeric());

        if c.is_alphanumeric() || (is_apostrophe(c) && current.is_some() && next_is_alnum) {
            let token = current.get_or_insert_with(|| Token {
                text: String::new(),
                start: idx,
                end: idx,
                sentence,
            });
            if is_apostrophe(c) {
                token.text.push('\'');
            } else {
                token.text.extend(c.to_lowercase());
            }
            token.end = idx + c.len_utf8();
            continue;
        }

        if let Some(token) = current.take() {
            tokens.push(token);
        }
        if is_sentence_end(text, idx, c) {
            sentence += 1;
        }
    }

    if let Some(token) = current {
        tokens.push(token);
    }
    tokens
}

/// A set of lowercase phrases, indexed by their first word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    by_first_word: HashMap<String, Vec<Vec<String>>>,
    len: usize,
}

impl Lexicon {
    /// Builds a lexicon from phrases. Blank and duplicate phrases are ignored.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Self::default();
        for phrase in phrases {
            lexicon.insert(phrase.as_ref());
        }
        lexicon
    }

    /// Adds a phrase. Returns `false` if it was blank or already present.
    pub fn insert(&mut self, phrase: &str) -> bool {
        let words: Vec<String> = tokenize(phrase).into_iter().map(|t| t.text).collect();
        let Some(first) = words.first().cloned() else {
            return false;
        };
        let bucket = self.by_first_word.entry(first).or_default();
        if bucket.contains(&words) {
            return false;
        }
        bucket.push(words);
        self.len += 1;
        true
    }

    /// Number of distinct phrases.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the lexicon holds no phrases.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any phrase occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        !self.find(&tokenize(text)).is_empty()
    }

    /// All phrase occurrences in token order.
    pub(crate) fn find(&self, tokens: &[Token]) -> Vec<PhraseMatch> {
        let mut found = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(candidates) = self.by_first_word.get(&token.text) else {
                continue;
            };
            for words in candidates {
                let end = i + words.len();
                if end > tokens.len() {
                    continue;
                }
                let window = &tokens[i..end];
                let same_sentence = window.iter().all(|t| t.sentence == token.sentence);
                if same_sentence && window.iter().zip(words).all(|(t, w)| &t.text == w) {
                    found.push(PhraseMatch { start: i, end });
                }
            }
        }
        found
    }
}
