use std::{collections::HashMap, time::Duration};

use quiz_grader::{
    GraderConfig, JudgeBackend, ParseFailurePolicy,
    config::{DEFAULT_BATCH_DELAY_MS, DEFAULT_JUDGE_TIMEOUT_SECS, DEFAULT_SIMILARITY_URL},
    error::ConfigError,
    types::DEFAULT_THRESHOLD,
};

fn load(vars: &[(&str, &str)]) -> Result<GraderConfig, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    GraderConfig::from_lookup(|key| vars.get(key).cloned())
}

const OPENAI_VARS: [(&str, &str); 3] = [
    ("OPENAI_ENDPOINT", "https://api.example.com/v1"),
    ("OPENAI_API_KEY", "sk-test"),
    ("OPENAI_MODEL", "gpt-4o-mini"),
];

#[test]
fn empty_environment_uses_defaults() {
    let config = load(&[]).expect("config");
    assert!(matches!(config.backend(), JudgeBackend::Disabled));
    assert_eq!(config.judge_timeout(), Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS));
    assert_eq!(config.batch_delay(), Duration::from_millis(DEFAULT_BATCH_DELAY_MS));
    assert_eq!(config.threshold(), DEFAULT_THRESHOLD);
    assert_eq!(config.parse_failure_policy(), ParseFailurePolicy::FullCascade);
}

#[test]
fn openai_is_picked_when_its_variables_are_present() {
    let config = load(&OPENAI_VARS).expect("config");
    let JudgeBackend::OpenAi(env) = config.backend() else {
        panic!("expected the openai backend, got {:?}", config.backend());
    };
    assert_eq!(env.model(), "gpt-4o-mini");
    assert_eq!(env.api_base(), "https://api.example.com/v1");
    assert!(!format!("{env:?}").contains("sk-test"));
}

#[test]
fn explicit_openai_without_key_is_an_error() {
    let err = load(&[
        ("QUIZ_JUDGE_BACKEND", "openai"),
        ("OPENAI_ENDPOINT", "https://api.example.com/v1"),
        ("OPENAI_MODEL", "gpt-4o-mini"),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingVariable {
            backend:  "openai".into(),
            variable: "OPENAI_API_KEY".into(),
        }
    );
}

#[test]
fn similarity_backend_defaults_its_url() {
    let config = load(&[("QUIZ_JUDGE_BACKEND", "SBERT")]).expect("config");
    assert!(matches!(
        config.backend(),
        JudgeBackend::Similarity(url) if url == DEFAULT_SIMILARITY_URL
    ));

    let config = load(&[
        ("QUIZ_JUDGE_BACKEND", "similarity"),
        ("SIMILARITY_SERVICE_URL", "http://grader.internal:9000"),
    ])
    .expect("config");
    assert!(matches!(
        config.backend(),
        JudgeBackend::Similarity(url) if url == "http://grader.internal:9000"
    ));
}

#[test]
fn none_backend_overrides_openai_variables() {
    let mut vars = OPENAI_VARS.to_vec();
    vars.push(("QUIZ_JUDGE_BACKEND", "none"));
    let config = load(&vars).expect("config");
    assert!(matches!(config.backend(), JudgeBackend::Disabled));
}

#[test]
fn unknown_backend_is_rejected() {
    assert_eq!(
        load(&[("QUIZ_JUDGE_BACKEND", "gemini")]).unwrap_err(),
        ConfigError::UnknownBackend("gemini".into())
    );
}

#[test]
fn numeric_settings_are_read_and_bad_ones_ignored() {
    let config = load(&[
        ("QUIZ_JUDGE_TIMEOUT_SECS", "5"),
        ("QUIZ_BATCH_DELAY_MS", "0"),
        ("QUIZ_THRESHOLD", "1.7"),
        ("QUIZ_PARSE_FAILURE_POLICY", "exact-only"),
    ])
    .expect("config");
    assert_eq!(config.judge_timeout(), Duration::from_secs(5));
    assert!(config.batch_delay().is_zero());
    assert_eq!(config.threshold(), 1.0);
    assert_eq!(config.parse_failure_policy(), ParseFailurePolicy::ExactOnly);

    let config = load(&[("QUIZ_JUDGE_TIMEOUT_SECS", "soon"), ("QUIZ_THRESHOLD", "high")])
        .expect("config");
    assert_eq!(config.judge_timeout(), Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS));
    assert_eq!(config.threshold(), DEFAULT_THRESHOLD);
}
