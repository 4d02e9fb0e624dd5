#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Recovers a `(similarityScore, explanation)` verdict from a judge's raw
//! text.
//!
//! Judges are asked for a bare JSON object but routinely wrap it in prose or
//! markdown fences. The whole text is tried first, then every balanced
//! `{...}` span in order of appearance. The first span that parses as a JSON
//! object wins, so brace-delimited prose such as a `{score}` placeholder
//! ahead of the verdict is skipped rather than failing the parse.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::ParseError, types::clamp_score};

/// Explanation used when the judge omits one.
pub const MISSING_EXPLANATION: &str = "No explanation provided by the judge";

/// A verdict extracted from judge output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Judgment {
    /// Score in `[0.0, 1.0]`.
    pub similarity_score: f64,
    /// Never empty.
    pub explanation:      String,
}

/// Parses raw judge output into a [`Judgment`].
pub fn parse_judgment(raw: &str) -> Result<Judgment, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Ok(judgment_from(&map));
    }

    for span in balanced_spans(raw) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(span) {
            return Ok(judgment_from(&map));
        }
    }

    Err(ParseError::NoObject)
}

/// Builds a judgment from a parsed object, coercing bad fields.
fn judgment_from(map: &Map<String, Value>) -> Judgment {
    let score = map
        .get("similarityScore")
        .or_else(|| map.get("similarity_score"))
        .map(coerce_score)
        .unwrap_or(0.0);

    let explanation = match map.get("explanation") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => MISSING_EXPLANATION.to_string(),
    };

    Judgment {
        similarity_score: score,
        explanation,
    }
}

/// Numbers pass through, numeric strings are parsed, everything else is `0`.
fn coerce_score(value: &Value) -> f64 {
    let score = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    clamp_score(score)
}

/// Yields every balanced `{...}` span, ignoring braces inside JSON strings.
fn balanced_spans(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(move |(start, _)| span_from(text, start))
}

/// Returns the balanced span that opens at byte offset `start`, if it closes.
fn span_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
