#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Similarity cutoff used when a caller does not supply one.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Clamps a threshold into `[0.0, 1.0]`, substituting the default for
/// non-finite values.
pub fn normalize_threshold(threshold: f64) -> f64 {
    if threshold.is_finite() {
        threshold.clamp(0.0, 1.0)
    } else {
        DEFAULT_THRESHOLD
    }
}

/// Clamps a similarity score into `[0.0, 1.0]`; anything non-finite becomes
/// `0.0`.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// A single answer to be graded.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    /// Full question text, possibly embedding a scenario.
    #[builder(default)]
    #[serde(default, alias = "questionText")]
    pub question:       String,
    /// What the student wrote (or what transcription produced).
    #[builder(default)]
    #[serde(default)]
    pub student_answer: String,
    /// Instructor-authored reference answer.
    #[builder(default)]
    #[serde(default)]
    pub correct_answer: String,
    /// Similarity cutoff in `[0.0, 1.0]`.
    #[builder(default = DEFAULT_THRESHOLD)]
    #[serde(default = "default_threshold")]
    pub threshold:      f64,
}

/// Serde default for [`GradingRequest::threshold`].
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl GradingRequest {
    /// Creates a request from its four parts.
    pub fn new(
        question: impl Into<String>,
        student_answer: impl Into<String>,
        correct_answer: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self {
            question: question.into(),
            student_answer: student_answer.into(),
            correct_answer: correct_answer.into(),
            threshold,
        }
    }
}

/// One entry of a batch: a request without its own threshold.
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Question text.
    #[builder(default)]
    #[serde(default, alias = "questionText")]
    pub question:       String,
    /// Student answer.
    #[builder(default)]
    #[serde(default)]
    pub student_answer: String,
    /// Reference answer.
    #[builder(default)]
    #[serde(default)]
    pub correct_answer: String,
}

impl BatchItem {
    /// Attaches a threshold, producing a full request.
    pub fn with_threshold(self, threshold: f64) -> GradingRequest {
        GradingRequest {
            question: self.question,
            student_answer: self.student_answer,
            correct_answer: self.correct_answer,
            threshold,
        }
    }
}

impl<Q, S, C> From<(Q, S, C)> for BatchItem
where
    Q: Into<String>,
    S: Into<String>,
    C: Into<String>,
{
    fn from((question, student_answer, correct_answer): (Q, S, C)) -> Self {
        Self {
            question:       question.into(),
            student_answer: student_answer.into(),
            correct_answer: correct_answer.into(),
        }
    }
}

/// Which path produced a [`GradingResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradingMethod {
    /// Terminal result for a missing student or reference answer.
    #[default]
    Input,
    /// Normalized answers were identical; no judge was consulted.
    Exact,
    /// The external semantic judge scored the answer.
    Primary,
    /// The deterministic matcher scored the answer.
    Fallback,
}

impl Display for GradingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GradingMethod::Input => "input",
            GradingMethod::Exact => "exact",
            GradingMethod::Primary => "primary",
            GradingMethod::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Outcome of grading one answer.
#[derive(Tabled, Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    #[tabled(rename = "Correct")]
    /// * `is_correct`: `similarity_score >= threshold`
    #[builder(getter)]
    pub is_correct:       bool,
    #[tabled(rename = "Score")]
    /// * `similarity_score`: value in `[0.0, 1.0]`
    #[builder(getter)]
    pub similarity_score: f64,
    #[tabled(rename = "Explanation")]
    /// * `explanation`: human-readable justification, never empty
    #[builder(getter)]
    pub explanation:      String,
    #[tabled(rename = "Method")]
    /// * `method`: which path produced the score
    #[builder(default)]
    #[builder(getter)]
    #[serde(default)]
    pub method:           GradingMethod,
}

impl GradingResult {
    /// Builds a result from a raw score, clamping it and comparing it against
    /// `threshold`.
    pub fn scored(
        score: f64,
        threshold: f64,
        explanation: impl Into<String>,
        method: GradingMethod,
    ) -> Self {
        let similarity_score = clamp_score(score);
        let mut explanation = explanation.into();
        if explanation.trim().is_empty() {
            explanation = String::from("No explanation provided");
        }

        Self {
            is_correct: similarity_score >= normalize_threshold(threshold),
            similarity_score,
            explanation,
            method,
        }
    }

    /// Builds a zero-score terminal result for unusable input.
    pub fn rejected(explanation: impl Into<String>) -> Self {
        Self::scored(0.0, DEFAULT_THRESHOLD, explanation, GradingMethod::Input)
    }
}
