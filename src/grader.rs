#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grading orchestration: judge first, deterministic matching when the judge
//! fails, and a sequential batch runner.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    config::{GraderConfig, ParseFailurePolicy},
    error::{DictionaryError, JudgeError, ParseError},
    fallback::{FallbackMatch, FallbackMatcher},
    judge::{ConfiguredJudge, SemanticJudge},
    parser::parse_judgment,
    types::{BatchItem, GradingMethod, GradingRequest, GradingResult, normalize_threshold},
    util::normalize,
};

/// Explanation for a blank student answer.
pub const NO_ANSWER: &str = "No answer provided";
/// Explanation for a blank reference answer.
pub const NO_REFERENCE: &str = "No reference answer available";

/// Grades answers with a judge and a fallback matcher.
#[derive(Clone)]
pub struct Grader<J = ConfiguredJudge> {
    /// External semantic judge.
    judge:   J,
    /// Deterministic matcher used when the judge fails.
    matcher: FallbackMatcher,
    /// Timeouts, pacing and policies.
    config:  GraderConfig,
}

impl Grader<ConfiguredJudge> {
    /// Builds the judge named in `config` and validates the built-in tables.
    pub fn from_config(config: GraderConfig) -> Result<Self> {
        let judge = ConfiguredJudge::from_config(&config)
            .with_context(|| format!("Could not set up the `{}` judge", config.backend().name()))?;
        Self::new(judge, config).context("Built-in matching tables are invalid")
    }
}

impl<J: SemanticJudge> Grader<J> {
    /// Creates a grader over the built-in fallback tables.
    pub fn new(judge: J, config: GraderConfig) -> Result<Self, DictionaryError> {
        Ok(Self::with_matcher(judge, FallbackMatcher::builtin()?, config))
    }

    /// Creates a grader with a custom fallback matcher.
    pub fn with_matcher(judge: J, matcher: FallbackMatcher, config: GraderConfig) -> Self {
        Self {
            judge,
            matcher,
            config,
        }
    }

    /// Returns the judge.
    pub fn judge(&self) -> &J {
        &self.judge
    }

    /// Returns the fallback matcher.
    pub fn matcher(&self) -> &FallbackMatcher {
        &self.matcher
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Grades one answer. Never fails: judge and parse errors produce a
    /// fallback result whose explanation says so.
    pub async fn grade(&self, request: &GradingRequest) -> GradingResult {
        let threshold = normalize_threshold(request.threshold);

        if request.student_answer.trim().is_empty() {
            info!("empty student answer, not grading");
            return GradingResult::rejected(NO_ANSWER);
        }
        if request.correct_answer.trim().is_empty() {
            warn!("no reference answer to compare against");
            return GradingResult::rejected(NO_REFERENCE);
        }
        if normalize(&request.student_answer) == normalize(&request.correct_answer) {
            return GradingResult::scored(1.0, threshold, "Exact match", GradingMethod::Exact);
        }

        let raw = match self.judge.judge(request).await {
            Ok(raw) => raw,
            Err(err) => return self.after_judge_failure(request, threshold, &err),
        };

        match parse_judgment(&raw) {
            Ok(judgment) => {
                let result = GradingResult::scored(
                    judgment.similarity_score,
                    threshold,
                    judgment.explanation,
                    GradingMethod::Primary,
                );
                info!(
                    judge = self.judge.name(),
                    score = result.similarity_score,
                    threshold,
                    correct = result.is_correct,
                    "judged answer"
                );
                result
            }
            Err(err) => self.after_parse_failure(request, threshold, &err),
        }
    }

    /// Grades one answer given as separate fields.
    pub async fn grade_answer(
        &self,
        question: &str,
        student_answer: &str,
        correct_answer: &str,
        threshold: f64,
    ) -> GradingResult {
        let request = GradingRequest::new(question, student_answer, correct_answer, threshold);
        self.grade(&request).await
    }

    /// Grades `items` one after another under a shared threshold, pausing
    /// after each call. Results come back in input order.
    pub async fn grade_batch<I, T>(&self, items: I, threshold: f64) -> Vec<GradingResult>
    where
        I: IntoIterator<Item = T>,
        T: Into<BatchItem>,
    {
        let items: Vec<BatchItem> = items.into_iter().map(Into::into).collect();
        let total = items.len();
        let delay = self.config.batch_delay();
        let mut results = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            let request = item.with_threshold(threshold);
            let result = self.grade(&request).await;
            info!(
                item = index + 1,
                total,
                method = %result.method,
                score = result.similarity_score,
                "graded batch item"
            );
            results.push(result);

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        results
    }

    /// Fallback after the judge could not be reached.
    fn after_judge_failure(
        &self,
        request: &GradingRequest,
        threshold: f64,
        err: &JudgeError,
    ) -> GradingResult {
        warn!(judge = self.judge.name(), "judge failed, using fallback matching: {err}");
        let outcome = self
            .matcher
            .evaluate(&request.student_answer, &request.correct_answer);

        GradingResult::scored(
            outcome.score,
            threshold,
            format!(
                "{} (judgment service unavailable, used fallback matching: {err})",
                outcome.explanation
            ),
            GradingMethod::Fallback,
        )
    }

    /// Fallback after the judge answered with something unparsable.
    fn after_parse_failure(
        &self,
        request: &GradingRequest,
        threshold: f64,
        err: &ParseError,
    ) -> GradingResult {
        warn!(judge = self.judge.name(), "judge response unusable, using fallback matching: {err}");
        let outcome: FallbackMatch = match self.config.parse_failure_policy() {
            ParseFailurePolicy::FullCascade => self
                .matcher
                .evaluate(&request.student_answer, &request.correct_answer),
            ParseFailurePolicy::ExactOnly => self
                .matcher
                .exact_only(&request.student_answer, &request.correct_answer),
        };

        GradingResult::scored(
            outcome.score,
            threshold,
            format!(
                "Judgment response could not be parsed ({err}); used fallback matching: {}",
                outcome.explanation
            ),
            GradingMethod::Fallback,
        )
    }
}
