#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Judge backed by an HTTP sentence-similarity service.
//!
//! The service takes `POST {base}/grade` with the answers and replies with
//! `{isCorrect, similarityScore, explanation}`. The body is handed back as raw
//! text so it goes through the same response parser as the chat judge.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{SemanticJudge, http_client, send};
use crate::{
    error::JudgeError,
    types::{GradingRequest, normalize_threshold},
};

/// Request body expected by the similarity service.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GradeBody<'a> {
    /// Question text.
    question_text:  &'a str,
    /// Student answer.
    student_answer: &'a str,
    /// Reference answer.
    correct_answer: &'a str,
    /// Threshold the service should report `isCorrect` against, always finite
    /// and within `[0.0, 1.0]`.
    threshold:      f64,
}

/// Scores answers through a similarity service.
#[derive(Debug, Clone)]
pub struct SimilarityServiceJudge {
    /// Shared HTTP client carrying the timeout.
    client:   Client,
    /// Full URL of the grading endpoint.
    endpoint: String,
    /// Per-call timeout, reported in errors.
    timeout:  Duration,
}

impl SimilarityServiceJudge {
    /// Creates a judge for the service rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, JudgeError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: format!("{}/grade", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    /// Returns the grading endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SemanticJudge for SimilarityServiceJudge {
    fn name(&self) -> &str {
        "similarity"
    }

    async fn judge(&self, request: &GradingRequest) -> Result<String, JudgeError> {
        let body = GradeBody {
            question_text:  &request.question,
            student_answer: &request.student_answer,
            correct_answer: &request.correct_answer,
            threshold:      normalize_threshold(request.threshold),
        };

        let text = send(self.client.post(&self.endpoint).json(&body), self.timeout).await?;
        debug!(endpoint = %self.endpoint, "similarity service response: {text}");
        Ok(text)
    }
}
