#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! External semantic judges.
//!
//! A judge returns the raw text of its verdict; parsing is the grader's job.
//! Judges never retry and never fall back themselves, every failure is
//! returned so the grader can switch to deterministic matching.

/// Chat-completion judge.
pub mod openai;
/// Instruction payload construction.
pub mod prompt;
/// HTTP similarity-service judge.
pub mod similarity;

use std::{future::Future, time::Duration};

pub use openai::OpenAiJudge;
pub use prompt::GradingPrompts;
pub use similarity::SimilarityServiceJudge;

use reqwest::{Client, RequestBuilder};

use crate::{
    config::{GraderConfig, JudgeBackend},
    error::JudgeError,
    types::GradingRequest,
    util::truncate,
};

/// Longest error body kept in a [`JudgeError::Status`].
const ERROR_BODY_LIMIT: usize = 300;

/// HTTP client shared by the judges of one backend. It makes a single attempt
/// per call, bounded by `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, JudgeError> {
    Client::builder()
        // Avoid macOS dynamic store lookups that fail in sandboxed environments.
        .no_proxy()
        .timeout(timeout)
        .build()
        .map_err(|e| JudgeError::Request(e.to_string()))
}

/// Sends `request` once and returns the response body. A non-success status
/// or an empty body is an error.
pub(crate) async fn send(request: RequestBuilder, timeout: Duration) -> Result<String, JudgeError> {
    let response = request
        .send()
        .await
        .map_err(|e| JudgeError::from_reqwest(e, timeout))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| JudgeError::from_reqwest(e, timeout))?;

    if !status.is_success() {
        return Err(JudgeError::Status {
            status: status.as_u16(),
            body:   truncate(&text, ERROR_BODY_LIMIT),
        });
    }
    if text.trim().is_empty() {
        return Err(JudgeError::EmptyResponse);
    }

    Ok(text)
}

/// Something that can judge whether two answers mean the same thing.
pub trait SemanticJudge: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns the judge's raw verdict text for `request`.
    ///
    /// Both answers are non-empty when the grader calls this.
    fn judge(
        &self,
        request: &GradingRequest,
    ) -> impl Future<Output = Result<String, JudgeError>> + Send;
}

/// Judge selected at runtime from [`GraderConfig`].
#[derive(Clone)]
pub enum ConfiguredJudge {
    /// Chat-completion judge.
    OpenAi(OpenAiJudge),
    /// Similarity-service judge.
    Similarity(SimilarityServiceJudge),
    /// No judge; every call fails with [`JudgeError::Unconfigured`].
    Disabled,
}

impl ConfiguredJudge {
    /// Builds the judge named by `config`.
    pub fn from_config(config: &GraderConfig) -> Result<Self, JudgeError> {
        Ok(match config.backend() {
            JudgeBackend::OpenAi(env) => {
                ConfiguredJudge::OpenAi(OpenAiJudge::new(env.clone(), config.judge_timeout())?)
            }
            JudgeBackend::Similarity(url) => ConfiguredJudge::Similarity(
                SimilarityServiceJudge::new(url, config.judge_timeout())?,
            ),
            JudgeBackend::Disabled => ConfiguredJudge::Disabled,
        })
    }
}

impl SemanticJudge for ConfiguredJudge {
    fn name(&self) -> &str {
        match self {
            ConfiguredJudge::OpenAi(judge) => judge.name(),
            ConfiguredJudge::Similarity(judge) => judge.name(),
            ConfiguredJudge::Disabled => "none",
        }
    }

    async fn judge(&self, request: &GradingRequest) -> Result<String, JudgeError> {
        match self {
            ConfiguredJudge::OpenAi(judge) => judge.judge(request).await,
            ConfiguredJudge::Similarity(judge) => judge.judge(request).await,
            ConfiguredJudge::Disabled => Err(JudgeError::Unconfigured),
        }
    }
}
