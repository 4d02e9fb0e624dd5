#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Error types for the grading core.
//!
//! None of these reach the caller of [`crate::grader::Grader::grade`]; judge
//! and parse failures are turned into fallback results there. They are public
//! so that judge implementations and configuration loaders can report them.

use std::time::Duration;

/// Failure while asking an external judge for a verdict.
#[derive(thiserror::Error, Debug)]
pub enum JudgeError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The judge did not answer within the configured timeout.
    #[error("judgment service timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    /// The judge answered with a non-success HTTP status.
    #[error("judgment service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body:   String,
    },
    /// The chat-completion API reported an error.
    #[error("judgment API error: {0}")]
    Api(String),
    /// The judge answered but produced no text.
    #[error("judgment service returned an empty response")]
    EmptyResponse,
    /// The outbound payload could not be assembled.
    #[error("could not build judgment request: {0}")]
    Request(String),
    /// No judge is configured.
    #[error("no judgment service configured")]
    Unconfigured,
}

impl JudgeError {
    /// Classifies a reqwest failure; `timeout` is the limit the request ran
    /// under.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            JudgeError::Timeout(timeout)
        } else if let Some(status) = err.status() {
            JudgeError::Status {
                status: status.as_u16(),
                body:   err.to_string(),
            }
        } else {
            JudgeError::Transport(err.to_string())
        }
    }
}

/// The judge's raw text did not contain a usable verdict.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing to parse.
    #[error("judgment response was empty")]
    Empty,
    /// Neither the whole text nor any brace-delimited span was a JSON object.
    #[error("no JSON object found in judgment response")]
    NoObject,
}

/// Structural problem in an embedded lookup table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// The table was not valid JSON of the expected shape.
    #[error("malformed table: {0}")]
    Malformed(String),
    /// A key normalized to the empty string.
    #[error("empty key in equivalence table")]
    EmptyKey,
    /// A key mapped to no equivalents.
    #[error("`{0}` maps to an empty list")]
    EmptyEntry(String),
    /// An equivalent phrase normalized to the empty string.
    #[error("`{0}` lists an empty equivalent")]
    EmptyEquivalent(String),
    /// A concept pattern failed to compile.
    #[error("pattern `{pattern}` is invalid: {reason}")]
    InvalidPattern {
        /// The offending regular expression.
        pattern: String,
        /// Compiler message.
        reason:  String,
    },
    /// A concept pattern has no terms to pair with.
    #[error("pattern `{0}` has no terms")]
    EmptyTerms(String),
}

/// Invalid configuration value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Backend name not recognised.
    #[error("unknown judge backend `{0}` (expected openai, similarity or none)")]
    UnknownBackend(String),
    /// A backend was selected without the variables it needs.
    #[error("judge backend `{backend}` requires {variable} to be set")]
    MissingVariable {
        /// Selected backend.
        backend:  String,
        /// Missing environment variable.
        variable: String,
    },
}
