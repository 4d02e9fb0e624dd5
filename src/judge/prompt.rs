#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Instruction payload sent to the chat judge.

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};

use crate::{error::JudgeError, types::GradingRequest};

/// Prompt templates for the chat judge.
#[derive(Debug, Clone)]
pub struct GradingPrompts {
    /// Grading rules, score bands and output format.
    policy:   String,
    /// Worked examples anchoring the score bands.
    examples: String,
}

impl Default for GradingPrompts {
    fn default() -> Self {
        Self {
            policy:   include_str!("../prompts/grading_policy.md").to_string(),
            examples: include_str!("../prompts/grading_examples.md").to_string(),
        }
    }
}

impl GradingPrompts {
    /// Creates a prompt bundle from custom templates.
    pub fn new(policy: impl Into<String>, examples: impl Into<String>) -> Self {
        Self {
            policy:   policy.into(),
            examples: examples.into(),
        }
    }

    /// Returns the grading policy.
    pub fn policy(&self) -> &str {
        &self.policy
    }

    /// Returns the worked examples.
    pub fn examples(&self) -> &str {
        &self.examples
    }

    /// System message: policy followed by the examples.
    pub fn system_message(&self) -> String {
        format!("{}\n\n{}", self.policy.trim_end(), self.examples.trim_end())
    }

    /// User message carrying the answers to compare.
    pub fn user_message(&self, request: &GradingRequest) -> String {
        let question = request.question.trim();
        let question = if question.is_empty() {
            "(no question text provided)"
        } else {
            question
        };

        format!(
            "Question: {question}\nReference answer: {}\nStudent answer: {}\n\nRespond with the \
             JSON object only.",
            request.correct_answer.trim(),
            request.student_answer.trim(),
        )
    }

    /// Assembles the chat messages for one request.
    pub fn build_messages(
        &self,
        request: &GradingRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, JudgeError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_message())
            .build()
            .map_err(|e| JudgeError::Request(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(self.user_message(request))
            .build()
            .map_err(|e| JudgeError::Request(e.to_string()))?;

        Ok(vec![system.into(), user.into()])
    }
}
