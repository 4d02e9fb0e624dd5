#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Regex rules that recognise a description of a concept whose name appears
//! in the other answer.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;

use crate::{
    error::DictionaryError,
    util::{contains_phrase, normalize},
};

/// Concept rules compiled into the binary.
const BUILTIN_PATTERNS: &str = include_str!("patterns.json");

/// Rule as authored in JSON.
#[derive(Debug, Deserialize)]
struct RawPattern {
    /// Concept name used in explanations.
    concept: String,
    /// Regular expression matching a description of the concept.
    pattern: String,
    /// Names of the concept.
    terms:   Vec<String>,
}

/// One compiled rule.
#[derive(Debug, Clone)]
pub struct ConceptPattern {
    /// Concept name used in explanations.
    concept: String,
    /// Matches a description of the concept in normalized text.
    regex:   Regex,
    /// Normalized names of the concept.
    terms:   Vec<String>,
}

impl ConceptPattern {
    /// Compiles a rule.
    pub fn new(
        concept: impl Into<String>,
        pattern: &str,
        terms: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, DictionaryError> {
        let regex = Regex::new(pattern).map_err(|e| DictionaryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason:  e.to_string(),
        })?;
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Err(DictionaryError::EmptyTerms(pattern.to_string()));
        }

        Ok(Self {
            concept: concept.into(),
            regex,
            terms,
        })
    }

    /// Concept name.
    pub fn concept(&self) -> &str {
        &self.concept
    }

    /// Whether `description` describes the concept and `named` names it.
    pub fn pairs(&self, description: &str, named: &str) -> bool {
        self.regex.is_match(description) && self.terms.iter().any(|t| contains_phrase(named, t))
    }
}

/// Ordered list of concept rules; the first rule that fires wins.
#[derive(Debug, Clone, Default)]
pub struct ConceptPatterns {
    /// Rules in evaluation order.
    rules: Vec<ConceptPattern>,
}

impl ConceptPatterns {
    /// Parses and compiles a JSON array of `{concept, pattern, terms}`.
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let raw: Vec<RawPattern> =
            serde_json::from_str(json).map_err(|e| DictionaryError::Malformed(e.to_string()))?;
        raw.into_iter()
            .map(|r| ConceptPattern::new(r.concept, &r.pattern, r.terms))
            .collect::<Result<Vec<_>, _>>()
            .map(|rules| Self { rules })
    }

    /// Builds a rule list from already compiled rules.
    pub fn from_rules(rules: Vec<ConceptPattern>) -> Self {
        Self { rules }
    }

    /// Returns the built-in rules, compiling them on first use.
    pub fn builtin() -> Result<Arc<Self>, DictionaryError> {
        static BUILTIN: OnceLock<Result<Arc<ConceptPatterns>, DictionaryError>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Self::from_json(BUILTIN_PATTERNS).map(Arc::new))
            .clone()
    }

    /// First rule where one answer describes what the other names, checked in
    /// both directions.
    pub fn find(&self, student: &str, reference: &str) -> Option<&ConceptPattern> {
        self.rules
            .iter()
            .find(|rule| rule.pairs(student, reference) || rule.pairs(reference, student))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
