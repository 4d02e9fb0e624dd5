use std::sync::Arc;

use quiz_grader::{
    error::DictionaryError,
    fallback::{
        ConceptPattern, ConceptPatterns, EquivalenceDictionary, FallbackMatcher, FallbackRule,
    },
};

fn matcher() -> FallbackMatcher {
    FallbackMatcher::builtin().expect("built-in tables are valid")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn builtin_tables_load() {
    let dict = EquivalenceDictionary::builtin().expect("dictionary");
    let patterns = ConceptPatterns::builtin().expect("patterns");
    assert!(!dict.is_empty());
    assert!(dict.phrase_count() > dict.len());
    assert!(!patterns.is_empty());
}

#[test]
fn builtin_dictionary_is_bidirectional() {
    let dict = EquivalenceDictionary::builtin().expect("dictionary");
    for (canonical, equivalents) in dict.entries() {
        assert!(!equivalents.is_empty(), "`{canonical}` has no equivalents");
        for equivalent in equivalents {
            assert!(
                dict.equivalents(equivalent).iter().any(|e| e == canonical),
                "`{equivalent}` does not resolve back to `{canonical}`"
            );
            assert!(dict.are_equivalent(canonical, equivalent));
            assert!(dict.are_equivalent(equivalent, canonical));
        }
    }
}

#[test]
fn dictionary_links_siblings_and_normalizes_lookups() {
    let dict = EquivalenceDictionary::from_entries([("ECG", vec!["EKG", "Electro Cardio Gram"])])
        .expect("valid");
    assert!(dict.are_equivalent("ekg", "electro   cardio gram"));
    assert!(dict.are_equivalent("  Electro Cardio Gram ", "ecg"));
    assert!(dict.equivalents("unknown").is_empty());
}

#[test]
fn dictionary_rejects_bad_structure() {
    assert_eq!(
        EquivalenceDictionary::from_entries([("water", Vec::<&str>::new())]).unwrap_err(),
        DictionaryError::EmptyEntry("water".into())
    );
    assert_eq!(
        EquivalenceDictionary::from_entries([("  ", vec!["x"])]).unwrap_err(),
        DictionaryError::EmptyKey
    );
    assert_eq!(
        EquivalenceDictionary::from_entries([("water", vec!["h2o", " "])]).unwrap_err(),
        DictionaryError::EmptyEquivalent("water".into())
    );
    assert_eq!(
        EquivalenceDictionary::from_entries([("water", vec!["Water"])]).unwrap_err(),
        DictionaryError::EmptyEntry("water".into())
    );
    assert!(matches!(
        EquivalenceDictionary::from_json("[1, 2]"),
        Err(DictionaryError::Malformed(_))
    ));
}

#[test]
fn patterns_reject_bad_rules() {
    assert!(matches!(
        ConceptPattern::new("broken", "(unclosed", ["x"]),
        Err(DictionaryError::InvalidPattern { .. })
    ));
    assert!(matches!(
        ConceptPattern::new("empty", "heart", Vec::<&str>::new()),
        Err(DictionaryError::EmptyTerms(_))
    ));
}

#[test]
fn exact_match_ignores_case_and_spacing() {
    let outcome = matcher().evaluate("  Paris ", "paris");
    assert_eq!(outcome.rule, FallbackRule::Exact);
    assert_eq!(outcome.score, 1.0);
}

#[test]
fn containment_scores_095() {
    let outcome = matcher().evaluate("the capital is paris", "Paris");
    assert_eq!(outcome.rule, FallbackRule::Containment);
    assert!(approx(outcome.score, 0.95));
}

#[test]
fn coarse_token_overlap_scales_with_ratio() {
    let outcome =
        matcher().evaluate("The rain saved their farms", "The rain watered their fields");
    assert_eq!(outcome.rule, FallbackRule::TokenOverlap);
    assert!(approx(outcome.score, 0.85 + 0.1 * 0.6));
}

#[test]
fn direct_dictionary_equivalence() {
    let outcome = matcher().evaluate("O2", "Oxygen");
    assert_eq!(outcome.rule, FallbackRule::DictionaryDirect);
    assert!(approx(outcome.score, 0.95));

    let reverse = matcher().evaluate("oxygen", "o2");
    assert_eq!(reverse.rule, FallbackRule::DictionaryDirect);
}

#[test]
fn dictionary_phrase_inside_answer() {
    let outcome = matcher().evaluate("we measured her bp", "blood pressure");
    assert_eq!(outcome.rule, FallbackRule::DictionaryPhrase);
    assert!(approx(outcome.score, 0.92));
}

#[test]
fn concept_pattern_fires_in_both_directions() {
    let forward = matcher().evaluate("electrical signal generated from the heart", "electro cardio gram");
    assert_eq!(forward.rule, FallbackRule::ConceptPattern);
    assert!(approx(forward.score, 0.93));
    assert!(forward.explanation.contains("electrocardiogram"));

    let backward = matcher().evaluate("electro cardio gram", "electrical signal generated from the heart");
    assert_eq!(backward.rule, FallbackRule::ConceptPattern);
}

#[test]
fn word_expansion_finds_multi_word_equivalent() {
    let outcome = matcher().evaluate("she is warm hearted", "She was kind to everyone");
    assert_eq!(outcome.rule, FallbackRule::WordExpansion);
    assert!(approx(outcome.score, 0.95));
    assert!(outcome.explanation.contains("warm hearted"));
}

#[test]
fn single_word_synonyms_use_the_synonym_rule() {
    let outcome = matcher().evaluate("He's caring", "He is kind and helpful");
    assert_eq!(outcome.rule, FallbackRule::WordSynonym);
    assert!(approx(outcome.score, 0.9));
    assert!(outcome.explanation.contains("\"caring\""));
    assert!(outcome.explanation.contains("\"kind\""));
}

#[test]
fn word_expansion_accepts_mostly_present_phrase() {
    let dict = EquivalenceDictionary::from_entries([(
        "hypertension",
        vec!["high arterial blood pressure"],
    )])
    .expect("valid");
    let matcher = FallbackMatcher::new(Arc::new(dict), Arc::new(ConceptPatterns::default()));

    let outcome = matcher.evaluate("arterial blood pressure", "hypertension");
    assert_eq!(outcome.rule, FallbackRule::WordExpansion);
    assert!(approx(outcome.score, 0.90));
}

#[test]
fn synonym_rule_pairs_words_inside_longer_answers() {
    let dict = EquivalenceDictionary::from_entries([("fast", vec!["quick"])]).expect("valid");
    let matcher = FallbackMatcher::new(Arc::new(dict), Arc::new(ConceptPatterns::default()));

    let outcome = matcher.evaluate("a quick reply", "fast response");
    assert_eq!(outcome.rule, FallbackRule::WordSynonym);
    assert!(approx(outcome.score, 0.9));
}

#[test]
fn loose_overlap_ignores_short_filler_words() {
    let matcher = FallbackMatcher::new(
        Arc::new(EquivalenceDictionary::default()),
        Arc::new(ConceptPatterns::default()),
    );

    let outcome = matcher.evaluate(
        "mitochondria power the cell and its own dna for all too",
        "mitochondria power cells",
    );
    assert_eq!(outcome.rule, FallbackRule::LooseOverlap);
    assert!(approx(outcome.score, 0.95));
}

#[test]
fn unrelated_answers_score_zero() {
    let outcome = matcher().evaluate("Liquid", "Water");
    assert_eq!(outcome.rule, FallbackRule::NoMatch);
    assert_eq!(outcome.score, 0.0);
}

#[test]
fn short_equivalents_do_not_match_inside_words() {
    let outcome = matcher().evaluate("plants absorb co2", "oxygen");
    assert_ne!(outcome.rule, FallbackRule::DictionaryPhrase);
    assert_ne!(outcome.rule, FallbackRule::WordExpansion);
}

#[test]
fn every_rule_explains_itself_and_stays_in_bounds() {
    let pairs = [
        ("paris", "Paris"),
        ("the capital is paris", "paris"),
        ("O2", "oxygen"),
        ("electrical activity of the heart muscle", "ECG"),
        ("Liquid", "Water"),
        ("", "water"),
    ];
    for (student, reference) in pairs {
        let outcome = matcher().evaluate(student, reference);
        assert!(!outcome.explanation.is_empty());
        assert!((0.0..=1.0).contains(&outcome.score), "{student} / {reference}");
    }
}

#[test]
fn exact_only_is_binary() {
    let m = matcher();
    assert_eq!(m.exact_only("PARIS", "paris").score, 1.0);
    assert_eq!(m.exact_only("O2", "oxygen").score, 0.0);
}
