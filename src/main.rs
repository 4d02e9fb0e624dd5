#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # quiz-grader
//!
//! Command-line front end for the answer grading engine. Configuration comes
//! from the environment (or a `.env` file): `QUIZ_JUDGE_BACKEND`,
//! `OPENAI_ENDPOINT`, `OPENAI_API_KEY`, `OPENAI_MODEL`,
//! `SIMILARITY_SERVICE_URL`, `QUIZ_JUDGE_TIMEOUT_SECS`, `QUIZ_BATCH_DELAY_MS`,
//! `QUIZ_THRESHOLD` and `QUIZ_PARSE_FAILURE_POLICY`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use quiz_grader::{BatchItem, FallbackMatcher, Grader, GraderConfig, scoring::award_points};
use tabled::{
    Table,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a single answer
    Grade {
        /// Question text
        question:  String,
        /// Student answer
        student:   String,
        /// Reference answer
        correct:   String,
        /// Threshold override
        threshold: Option<f64>,
        /// Points the question is worth
        points:    Option<f64>,
    },
    /// Grade answers listed in a JSON file
    Batch {
        /// Path to the JSON file
        file:      PathBuf,
        /// Threshold override
        threshold: Option<f64>,
        /// Print JSON instead of a table
        json:      bool,
    },
    /// Validate the built-in matching tables
    Check,
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// Enables debug logging
    verbose: bool,
    /// Subcommand to run
    cmd:     Cmd,
}

/// Parse the command line arguments and return the options
fn options() -> Opts {
    /// parses an optional threshold
    fn threshold_arg() -> impl Parser<Option<f64>> {
        long("threshold")
            .short('t')
            .help("Similarity cutoff between 0.0 and 1.0")
            .argument::<f64>("T")
            .optional()
    }

    let grade = {
        let question = positional::<String>("QUESTION").help("Question text");
        let student = positional::<String>("STUDENT").help("Student answer");
        let correct = positional::<String>("CORRECT").help("Reference answer");
        let threshold = threshold_arg();
        let points = long("points")
            .short('p')
            .help("Points the question is worth; prints the award")
            .argument::<f64>("P")
            .optional();
        construct!(Cmd::Grade {
            threshold,
            points,
            question,
            student,
            correct
        })
        .to_options()
        .command("grade")
        .help("Grade a single answer")
    };

    let batch = {
        let threshold = threshold_arg();
        let json = long("json").help("Print results as JSON").switch();
        let file = positional::<PathBuf>("FILE")
            .help("JSON array of {questionText, studentAnswer, correctAnswer}");
        construct!(Cmd::Batch {
            threshold,
            json,
            file
        })
        .to_options()
        .command("batch")
        .help("Grade answers from a file, in order")
    };

    let check = pure(Cmd::Check)
        .to_options()
        .command("check")
        .help("Validate the built-in equivalence dictionary and concept patterns");

    let verbose = short('v')
        .long("verbose")
        .help("Show debug logs")
        .switch();
    let cmd = construct!([grade, batch, check]);

    construct!(Opts { verbose, cmd })
        .to_options()
        .descr("Semantic grading for free-text quiz answers")
        .run()
}

/// Renders results as a table.
fn results_table<T: tabled::Tabled>(title: &str, rows: &[T]) -> String {
    Table::new(rows)
        .with(Panel::header(title))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();

    match opts.cmd {
        Cmd::Grade {
            question,
            student,
            correct,
            threshold,
            points,
        } => {
            let config = GraderConfig::from_env().context("Invalid grader configuration")?;
            let threshold = threshold.unwrap_or(config.threshold());
            let grader = Grader::from_config(config)?;

            let result = grader
                .grade_answer(&question, &student, &correct, threshold)
                .await;
            println!("{}", results_table("Grading Result", std::slice::from_ref(&result)));

            if let Some(max_points) = points {
                let award = award_points(result.similarity_score, max_points);
                println!("{}", results_table("Points", &[award]));
            }
        }
        Cmd::Batch {
            file,
            threshold,
            json,
        } => {
            let config = GraderConfig::from_env().context("Invalid grader configuration")?;
            let threshold = threshold.unwrap_or(config.threshold());
            let grader = Grader::from_config(config)?;

            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            let items: Vec<BatchItem> = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a JSON array of answers", file.display()))?;

            let results = grader.grade_batch(items, threshold).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let correct = results.iter().filter(|r| r.is_correct).count();
                let title = format!("Batch Results ({correct}/{} correct)", results.len());
                println!("{}", results_table(&title, &results));
            }
        }
        Cmd::Check => {
            let matcher =
                FallbackMatcher::builtin().context("Built-in matching tables are invalid")?;
            println!(
                "Equivalence dictionary: {} entries, {} phrases",
                matcher.dictionary().len(),
                matcher.dictionary().phrase_count()
            );
            println!("Concept patterns: {} rules", matcher.patterns().len());
        }
    };

    Ok(())
}
