#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Chat-completion judge for OpenAI-compatible endpoints.
//!
//! The request is assembled with async-openai's types and posted once with
//! reqwest. Rate limits and server errors come back as
//! [`JudgeError::Status`] without being retried.

use std::time::Duration;

use async_openai::types::chat::CreateChatCompletionRequestArgs;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{SemanticJudge, http_client, send, prompt::GradingPrompts};
use crate::{config::OpenAiEnv, error::JudgeError, types::GradingRequest};

/// Asks a chat model to score the answer against the grading policy.
#[derive(Debug, Clone)]
pub struct OpenAiJudge {
    /// HTTP client carrying the timeout.
    client:   Client,
    /// `{api_base}/chat/completions`.
    endpoint: String,
    /// Model and sampling settings.
    env:      OpenAiEnv,
    /// Instruction templates.
    prompts:  GradingPrompts,
    /// Per-call timeout.
    timeout:  Duration,
}

impl OpenAiJudge {
    /// Creates a judge with the default prompts.
    pub fn new(env: OpenAiEnv, timeout: Duration) -> Result<Self, JudgeError> {
        Self::with_prompts(env, GradingPrompts::default(), timeout)
    }

    /// Creates a judge with custom prompts.
    pub fn with_prompts(
        env: OpenAiEnv,
        prompts: GradingPrompts,
        timeout: Duration,
    ) -> Result<Self, JudgeError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: format!("{}/chat/completions", env.api_base().trim_end_matches('/')),
            env,
            prompts,
            timeout,
        })
    }

    /// Returns the chat-completions URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the prompt templates.
    pub fn prompts(&self) -> &GradingPrompts {
        &self.prompts
    }
}

impl SemanticJudge for OpenAiJudge {
    fn name(&self) -> &str {
        "openai"
    }

    async fn judge(&self, request: &GradingRequest) -> Result<String, JudgeError> {
        let messages = self.prompts.build_messages(request)?;
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(self.env.model())
            .messages(messages)
            .temperature(self.env.temperature())
            .max_completion_tokens(self.env.max_tokens())
            .build()
            .map_err(|e| JudgeError::Request(e.to_string()))?;

        let body = send(
            self.client
                .post(&self.endpoint)
                .bearer_auth(self.env.api_key())
                .json(&chat_request),
            self.timeout,
        )
        .await?;

        let response: Value = serde_json::from_str(&body)
            .map_err(|e| JudgeError::Api(format!("malformed chat completion: {e}")))?;
        if let Some(message) = response.pointer("/error/message").and_then(Value::as_str) {
            return Err(JudgeError::Api(message.to_string()));
        }

        let content = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(JudgeError::EmptyResponse)?;

        debug!(model = self.env.model(), "judge response: {content}");
        Ok(content.to_string())
    }
}
