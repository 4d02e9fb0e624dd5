#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grader configuration, read from the environment and passed explicitly to
//! the judges and the grader.

use std::time::Duration;

use bon::Builder;

use crate::{
    error::ConfigError,
    types::{DEFAULT_THRESHOLD, normalize_threshold},
};

/// Default per-call judge timeout.
pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 30;
/// Default pause between batch items.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 100;
/// Default sampling temperature for the chat judge.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
/// Default output cap for the chat judge.
pub const DEFAULT_MAX_TOKENS: u32 = 200;
/// Default similarity-service location.
pub const DEFAULT_SIMILARITY_URL: &str = "http://localhost:5002";

/// OpenAI-compatible chat endpoint settings.
#[derive(Clone, Builder)]
#[builder(on(String, into))]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate requests.
    api_key:     String,
    /// Model identifier for chat completions.
    model:       String,
    /// Sampling temperature.
    #[builder(default = DEFAULT_TEMPERATURE)]
    temperature: f32,
    /// Output length cap.
    #[builder(default = DEFAULT_MAX_TOKENS)]
    max_tokens:  u32,
}

impl OpenAiEnv {
    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Returns the output length cap.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl std::fmt::Debug for OpenAiEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEnv")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Which external judge to consult.
#[derive(Debug, Clone, Default)]
pub enum JudgeBackend {
    /// LLM chat-completion judge.
    OpenAi(OpenAiEnv),
    /// HTTP sentence-similarity service at the given base URL.
    Similarity(String),
    /// No external judge; every answer goes to the fallback matcher.
    #[default]
    Disabled,
}

impl JudgeBackend {
    /// Short name for logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            JudgeBackend::OpenAi(_) => "openai",
            JudgeBackend::Similarity(_) => "similarity",
            JudgeBackend::Disabled => "none",
        }
    }
}

/// What to do when the judge answered but its output could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseFailurePolicy {
    /// Run the whole fallback cascade, as for a transport failure.
    #[default]
    FullCascade,
    /// Only accept identical answers.
    ExactOnly,
}

/// Everything the grader needs besides the answers themselves.
#[derive(Debug, Clone, Builder)]
pub struct GraderConfig {
    /// External judge selection.
    #[builder(default)]
    backend:              JudgeBackend,
    /// Per-call judge timeout.
    #[builder(default = Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS))]
    judge_timeout:        Duration,
    /// Pause after each batch item.
    #[builder(default = Duration::from_millis(DEFAULT_BATCH_DELAY_MS))]
    batch_delay:          Duration,
    /// Threshold used when the caller does not give one.
    #[builder(default = DEFAULT_THRESHOLD)]
    threshold:            f64,
    /// Handling of unparsable judge output.
    #[builder(default)]
    parse_failure_policy: ParseFailurePolicy,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GraderConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let openai = || -> Result<OpenAiEnv, ConfigError> {
            let require = |key: &str| {
                var(key).ok_or_else(|| ConfigError::MissingVariable {
                    backend:  "openai".into(),
                    variable: key.into(),
                })
            };
            Ok(OpenAiEnv {
                api_base:    require("OPENAI_ENDPOINT")?,
                api_key:     require("OPENAI_API_KEY")?,
                model:       require("OPENAI_MODEL")?,
                temperature: var("OPENAI_TEMPERATURE")
                    .and_then(|s| s.parse::<f32>().ok())
                    .unwrap_or(DEFAULT_TEMPERATURE),
                max_tokens:  var("OPENAI_MAX_TOKENS")
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(DEFAULT_MAX_TOKENS),
            })
        };
        let similarity = || {
            var("SIMILARITY_SERVICE_URL").unwrap_or_else(|| DEFAULT_SIMILARITY_URL.to_string())
        };

        let backend = match var("QUIZ_JUDGE_BACKEND")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("openai") => JudgeBackend::OpenAi(openai()?),
            Some("similarity") | Some("sbert") => JudgeBackend::Similarity(similarity()),
            Some("none") | Some("fallback") => JudgeBackend::Disabled,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
            None => openai()
                .map(JudgeBackend::OpenAi)
                .unwrap_or(JudgeBackend::Disabled),
        };

        let parse_failure_policy = match var("QUIZ_PARSE_FAILURE_POLICY")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("exact") | Some("exact-only") => ParseFailurePolicy::ExactOnly,
            _ => ParseFailurePolicy::FullCascade,
        };

        Ok(Self {
            backend,
            judge_timeout: Duration::from_secs(read_u64(
                &var,
                "QUIZ_JUDGE_TIMEOUT_SECS",
                DEFAULT_JUDGE_TIMEOUT_SECS,
            )),
            batch_delay: Duration::from_millis(read_u64(
                &var,
                "QUIZ_BATCH_DELAY_MS",
                DEFAULT_BATCH_DELAY_MS,
            )),
            threshold: var("QUIZ_THRESHOLD")
                .and_then(|s| s.parse::<f64>().ok())
                .map(normalize_threshold)
                .unwrap_or(DEFAULT_THRESHOLD),
            parse_failure_policy,
        })
    }

    /// Returns the judge selection.
    pub fn backend(&self) -> &JudgeBackend {
        &self.backend
    }

    /// Returns the per-call judge timeout.
    pub fn judge_timeout(&self) -> Duration {
        self.judge_timeout
    }

    /// Returns the pause inserted after each batch item.
    pub fn batch_delay(&self) -> Duration {
        self.batch_delay
    }

    /// Returns the default threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the parse-failure handling.
    pub fn parse_failure_policy(&self) -> ParseFailurePolicy {
        self.parse_failure_policy
    }
}

/// Parses an integer variable, falling back to `default` when it is missing
/// or does not parse.
fn read_u64<F>(var: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}
