#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Deterministic answer matching used when the external judge cannot be.
//!
//! Rules are tried in a fixed order and the first one that fires decides the
//! score. The matcher knows nothing about thresholds.

/// Bidirectional phrase-equivalence table.
pub mod dictionary;
/// Concept-description regex rules.
pub mod patterns;

use std::{fmt::Display, sync::Arc};

pub use dictionary::EquivalenceDictionary;
pub use patterns::{ConceptPattern, ConceptPatterns};
use tracing::debug;

use crate::{
    error::DictionaryError,
    util::{contains_phrase, normalize, tokens},
};

/// Score for identical answers.
const EXACT_SCORE: f64 = 1.0;
/// Score when one answer contains the other.
const CONTAINMENT_SCORE: f64 = 0.95;
/// Score when the whole answers are listed as equivalent.
const DICTIONARY_DIRECT_SCORE: f64 = 0.95;
/// Score when one answer contains an equivalent of the other.
const DICTIONARY_PHRASE_SCORE: f64 = 0.92;
/// Score when one answer describes a concept the other names.
const CONCEPT_SCORE: f64 = 0.93;
/// Score when a reference word's multi-word equivalent appears verbatim.
const WORD_EXPANSION_SCORE: f64 = 0.95;
/// Score when a reference word's multi-word equivalent is mostly present.
const WORD_EXPANSION_PARTIAL_SCORE: f64 = 0.90;
/// Score when a pair of words are listed as synonyms.
const WORD_SYNONYM_SCORE: f64 = 0.9;
/// Base score for token overlap rules.
const OVERLAP_BASE: f64 = 0.85;
/// Ceiling for token overlap rules.
const OVERLAP_CAP: f64 = 0.95;
/// Minimum overlap ratio for the coarse overlap rule.
const COARSE_OVERLAP_MIN: f64 = 0.3;
/// Minimum overlap ratio for the loose overlap rule.
const LOOSE_OVERLAP_MIN: f64 = 0.4;
/// Share of an equivalent phrase's words that must appear for a partial hit.
const PARTIAL_PHRASE_MIN: f64 = 0.75;

/// The rule that decided a fallback score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRule {
    /// Case-insensitive identical answers.
    Exact,
    /// One answer contains the other.
    Containment,
    /// Enough words (longer than two characters) are shared.
    TokenOverlap,
    /// The whole answers are listed as equivalent.
    DictionaryDirect,
    /// One answer contains an equivalent of the other.
    DictionaryPhrase,
    /// One answer describes a concept that the other names.
    ConceptPattern,
    /// A multi-word equivalent of a reference word appears in the answer.
    WordExpansion,
    /// A student word and a reference word are listed as synonyms.
    WordSynonym,
    /// Enough words (longer than three characters) are shared.
    LooseOverlap,
    /// Nothing matched.
    NoMatch,
}

impl Display for FallbackRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FallbackRule::Exact => "exact",
            FallbackRule::Containment => "containment",
            FallbackRule::TokenOverlap => "token-overlap",
            FallbackRule::DictionaryDirect => "dictionary-direct",
            FallbackRule::DictionaryPhrase => "dictionary-phrase",
            FallbackRule::ConceptPattern => "concept-pattern",
            FallbackRule::WordExpansion => "word-expansion",
            FallbackRule::WordSynonym => "word-synonym",
            FallbackRule::LooseOverlap => "loose-overlap",
            FallbackRule::NoMatch => "no-match",
        };
        f.write_str(name)
    }
}

/// Outcome of the fallback cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackMatch {
    /// Score in `[0.0, 1.0]`.
    pub score:       f64,
    /// Rule that fired.
    pub rule:        FallbackRule,
    /// Names the rule and what it matched.
    pub explanation: String,
}

impl FallbackMatch {
    /// Convenience constructor.
    fn new(score: f64, rule: FallbackRule, explanation: impl Into<String>) -> Self {
        Self {
            score,
            rule,
            explanation: explanation.into(),
        }
    }
}

/// Dependency-free semantic approximator.
#[derive(Debug, Clone)]
pub struct FallbackMatcher {
    /// Phrase equivalences.
    dictionary: Arc<EquivalenceDictionary>,
    /// Concept-description rules.
    patterns:   Arc<ConceptPatterns>,
}

impl FallbackMatcher {
    /// Creates a matcher over the given tables.
    pub fn new(dictionary: Arc<EquivalenceDictionary>, patterns: Arc<ConceptPatterns>) -> Self {
        Self {
            dictionary,
            patterns,
        }
    }

    /// Creates a matcher over the built-in tables, validating them.
    pub fn builtin() -> Result<Self, DictionaryError> {
        Ok(Self::new(EquivalenceDictionary::builtin()?, ConceptPatterns::builtin()?))
    }

    /// The equivalence table in use.
    pub fn dictionary(&self) -> &EquivalenceDictionary {
        &self.dictionary
    }

    /// The concept rules in use.
    pub fn patterns(&self) -> &ConceptPatterns {
        &self.patterns
    }

    /// Only the exact-match rule: `1.0` for identical answers, else `0.0`.
    pub fn exact_only(&self, student: &str, reference: &str) -> FallbackMatch {
        if normalize(student) == normalize(reference) {
            FallbackMatch::new(EXACT_SCORE, FallbackRule::Exact, "Exact match")
        } else {
            FallbackMatch::new(0.0, FallbackRule::NoMatch, "Answers are not identical")
        }
    }

    /// Runs the full cascade.
    pub fn evaluate(&self, student: &str, reference: &str) -> FallbackMatch {
        let student = normalize(student);
        let reference = normalize(reference);
        let outcome = self.cascade(&student, &reference);
        debug!(rule = %outcome.rule, score = outcome.score, "fallback matcher decided");
        outcome
    }

    /// The ordered rules over normalized answers.
    fn cascade(&self, student: &str, reference: &str) -> FallbackMatch {
        if student == reference {
            return FallbackMatch::new(EXACT_SCORE, FallbackRule::Exact, "Exact match");
        }

        if student.is_empty() || reference.is_empty() {
            return no_match();
        }

        if student.contains(reference) || reference.contains(student) {
            return FallbackMatch::new(
                CONTAINMENT_SCORE,
                FallbackRule::Containment,
                "One answer contains the other",
            );
        }

        let ratio = overlap_ratio(&tokens(student, 2), &tokens(reference, 2));
        if ratio >= COARSE_OVERLAP_MIN {
            return FallbackMatch::new(
                overlap_score(ratio),
                FallbackRule::TokenOverlap,
                format!("Key terms overlap ({:.0}% of words match)", ratio * 100.0),
            );
        }

        if self.dictionary.are_equivalent(student, reference) {
            return FallbackMatch::new(
                DICTIONARY_DIRECT_SCORE,
                FallbackRule::DictionaryDirect,
                format!("\"{student}\" is a known equivalent of \"{reference}\""),
            );
        }

        if let Some(phrase) = self.shared_equivalent(student, reference) {
            return FallbackMatch::new(
                DICTIONARY_PHRASE_SCORE,
                FallbackRule::DictionaryPhrase,
                format!("Answer contains the equivalent phrase \"{phrase}\""),
            );
        }

        if let Some(rule) = self.patterns.find(student, reference) {
            return FallbackMatch::new(
                CONCEPT_SCORE,
                FallbackRule::ConceptPattern,
                format!("One answer describes \"{}\", which the other names", rule.concept()),
            );
        }

        if let Some(found) = self.word_expansion(student, reference) {
            return found;
        }

        if let Some((s, r)) = self.word_synonym(student, reference) {
            return FallbackMatch::new(
                WORD_SYNONYM_SCORE,
                FallbackRule::WordSynonym,
                format!("\"{s}\" is a synonym of \"{r}\""),
            );
        }

        let ratio = overlap_ratio(&tokens(student, 3), &tokens(reference, 3));
        if ratio >= LOOSE_OVERLAP_MIN {
            return FallbackMatch::new(
                overlap_score(ratio),
                FallbackRule::LooseOverlap,
                format!("Some key terms overlap ({:.0}% of longer words match)", ratio * 100.0),
            );
        }

        no_match()
    }

    /// An equivalent of one answer that appears inside the other.
    fn shared_equivalent(&self, student: &str, reference: &str) -> Option<String> {
        let forward = self
            .dictionary
            .equivalents(reference)
            .iter()
            .find(|e| contains_phrase(student, e));
        let backward = || {
            self.dictionary
                .equivalents(student)
                .iter()
                .find(|e| contains_phrase(reference, e))
        };
        forward.or_else(backward).cloned()
    }

    /// Expands each reference word through the dictionary and looks for a
    /// multi-word expansion in the student answer. Single-word equivalents are
    /// left to [`Self::word_synonym`].
    fn word_expansion(&self, student: &str, reference: &str) -> Option<FallbackMatch> {
        let student_tokens = tokens(student, 0);
        let mut partial = None;

        for word in tokens(reference, 0) {
            for phrase in self.dictionary.equivalents(&word) {
                if !phrase.contains(' ') {
                    continue;
                }
                if contains_phrase(student, phrase) {
                    return Some(FallbackMatch::new(
                        WORD_EXPANSION_SCORE,
                        FallbackRule::WordExpansion,
                        format!("\"{phrase}\" in the answer is equivalent to \"{word}\""),
                    ));
                }

                if partial.is_none() {
                    let phrase_tokens = tokens(phrase, 0);
                    let hits = phrase_tokens
                        .iter()
                        .filter(|t| student_tokens.contains(t))
                        .count();
                    let share = hits as f64 / phrase_tokens.len().max(1) as f64;
                    if hits >= 2 && share >= PARTIAL_PHRASE_MIN {
                        partial = Some(FallbackMatch::new(
                            WORD_EXPANSION_PARTIAL_SCORE,
                            FallbackRule::WordExpansion,
                            format!(
                                "Answer covers most of \"{phrase}\", an equivalent of \"{word}\""
                            ),
                        ));
                    }
                }
            }
        }

        partial
    }

    /// First pair of words, one from each answer, listed as synonyms.
    fn word_synonym(&self, student: &str, reference: &str) -> Option<(String, String)> {
        let reference_tokens = tokens(reference, 0);
        tokens(student, 0).into_iter().find_map(|s| {
            reference_tokens
                .iter()
                .find(|r| self.dictionary.are_equivalent(&s, r))
                .map(|r| (s.clone(), r.clone()))
        })
    }
}

/// Terminal no-match outcome.
fn no_match() -> FallbackMatch {
    FallbackMatch::new(0.0, FallbackRule::NoMatch, "No semantic match found")
}

/// Share of student words matching some reference word, over the larger word
/// count. Words match when equal or when one contains the other.
pub fn overlap_ratio(student: &[String], reference: &[String]) -> f64 {
    if student.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let matching = student
        .iter()
        .filter(|s| {
            reference
                .iter()
                .any(|r| r.contains(s.as_str()) || s.contains(r.as_str()))
        })
        .count();

    matching as f64 / student.len().max(reference.len()) as f64
}

/// `0.85 + 0.1 × ratio`, capped.
fn overlap_score(ratio: f64) -> f64 {
    (OVERLAP_BASE + 0.1 * ratio).min(OVERLAP_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokens(text, 2)
    }

    #[test]
    fn overlap_counts_substring_matches() {
        let ratio = overlap_ratio(&words("heart cells"), &words("cell of the heart"));
        assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_of_nothing_is_zero() {
        assert_eq!(overlap_ratio(&[], &words("water")), 0.0);
    }

    #[test]
    fn overlap_score_is_capped() {
        assert_eq!(overlap_score(1.0), OVERLAP_CAP);
        assert!((overlap_score(0.5) - 0.9).abs() < 1e-9);
    }
}
