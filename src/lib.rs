//! # quiz-grader
//!
//! Decides whether a student's free-text answer means the same thing as the
//! instructor's reference answer. An external semantic judge is asked first; if
//! it is unreachable or its answer cannot be parsed, a deterministic matcher
//! built on an equivalence dictionary and concept patterns takes over.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-driven configuration
pub mod config;
/// Error types
pub mod error;
/// Deterministic fallback matching
pub mod fallback;
/// Grading orchestration and batch grading
pub mod grader;
/// External semantic judges
pub mod judge;
/// Extracting verdicts from judge output
pub mod parser;
/// Similarity score to question points
pub mod scoring;
/// Request and result types
pub mod types;
/// Text normalization helpers
pub mod util;

pub use config::{GraderConfig, JudgeBackend, ParseFailurePolicy};
pub use fallback::{EquivalenceDictionary, FallbackMatcher};
pub use grader::Grader;
pub use judge::{ConfiguredJudge, SemanticJudge};
pub use types::{BatchItem, GradingMethod, GradingRequest, GradingResult};
