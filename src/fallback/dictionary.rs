#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Process-wide table of phrases that mean the same thing.
//!
//! The table is written as `canonical -> [equivalents]` and indexed in both
//! directions at load time: every member of a group resolves to every other
//! member, canonical phrase included.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, OnceLock},
};

use crate::{error::DictionaryError, util::normalize};

/// Equivalence table compiled into the binary.
const BUILTIN_EQUIVALENCES: &str = include_str!("equivalences.json");

/// Validated, bidirectional phrase-equivalence lookup.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceDictionary {
    /// Entries as authored, keys and values normalized.
    entries: BTreeMap<String, Vec<String>>,
    /// Member phrase to every other member of its groups.
    index:   HashMap<String, Vec<String>>,
}

impl EquivalenceDictionary {
    /// Parses and validates a JSON object of `canonical -> [equivalents]`.
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| DictionaryError::Malformed(e.to_string()))?;
        Self::from_entries(raw)
    }

    /// Builds a dictionary from in-memory entries, normalizing and validating
    /// each one.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut dict = Self::default();

        for (key, values) in entries {
            let canonical = normalize(key.as_ref());
            if canonical.is_empty() {
                return Err(DictionaryError::EmptyKey);
            }
            if values.is_empty() {
                return Err(DictionaryError::EmptyEntry(canonical));
            }

            let mut group = Vec::with_capacity(values.len());
            for value in values {
                let value = normalize(value.as_ref());
                if value.is_empty() {
                    return Err(DictionaryError::EmptyEquivalent(canonical));
                }
                if value != canonical && !group.contains(&value) {
                    group.push(value);
                }
            }
            if group.is_empty() {
                return Err(DictionaryError::EmptyEntry(canonical));
            }

            dict.link(&canonical, &group);
            dict.entries.entry(canonical).or_default().extend(group);
        }

        Ok(dict)
    }

    /// Returns the built-in table, loading and validating it on first use.
    pub fn builtin() -> Result<Arc<Self>, DictionaryError> {
        static BUILTIN: OnceLock<Result<Arc<EquivalenceDictionary>, DictionaryError>> =
            OnceLock::new();
        BUILTIN
            .get_or_init(|| Self::from_json(BUILTIN_EQUIVALENCES).map(Arc::new))
            .clone()
    }

    /// Records every member of `canonical ∪ group` as equivalent to every
    /// other member.
    fn link(&mut self, canonical: &str, group: &[String]) {
        let members: Vec<&str> = std::iter::once(canonical)
            .chain(group.iter().map(String::as_str))
            .collect();

        for member in &members {
            let slot = self.index.entry((*member).to_string()).or_default();
            for other in &members {
                if other != member && !slot.iter().any(|s| s == other) {
                    slot.push((*other).to_string());
                }
            }
        }
    }

    /// Every phrase equivalent to `phrase`, in authoring order.
    pub fn equivalents(&self, phrase: &str) -> &[String] {
        self.index
            .get(&normalize(phrase))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `a` and `b` are listed as equivalent, in either direction.
    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        let b = normalize(b);
        self.equivalents(a).iter().any(|e| *e == b)
    }

    /// Entries as authored: canonical phrase and its equivalents.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of canonical entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct phrases reachable by lookup.
    pub fn phrase_count(&self) -> usize {
        self.index.len()
    }
}
