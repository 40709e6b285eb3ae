//! Integration tests for single-message prediction

use spamguard::{Label, PipelineBuilder, PipelineConfig, PredictionPipeline, PredictionResult, SpamGuardError};
use std::path::PathBuf;

fn fixture_models() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/models")
}

fn fixture_pipeline() -> PredictionPipeline {
    PipelineBuilder::new(PipelineConfig::default())
        .model_dir(fixture_models())
        .build()
        .unwrap()
}

#[test]
fn test_obvious_spam() {
    let pipeline = fixture_pipeline();
    let result = pipeline.predict_single_email("Congratulations! You won $1,000,000! Click here now!!!");

    assert_eq!(result.prediction, Label::Spam);
    assert!(result.confidence > 90.0, "confidence was {}", result.confidence);
}

#[test]
fn test_business_mail_is_ham() {
    let pipeline = fixture_pipeline();
    let result = pipeline.predict_single_email("Hi John, attached is the quarterly report for review.");

    assert_eq!(result.prediction, Label::Ham);
    assert!(result.confidence > 90.0);
}

#[test]
fn test_empty_input_returns_default() {
    let pipeline = fixture_pipeline();

    assert_eq!(pipeline.predict_single_email(""), PredictionResult::EMPTY_DEFAULT);
    assert_eq!(pipeline.predict_single_email("  \r\n\t  "), PredictionResult::EMPTY_DEFAULT);
}

#[test]
fn test_confidence_is_for_predicted_label() {
    let pipeline = fixture_pipeline();

    // Every verdict reports the probability of its own label, so it never drops below 50
    for text in [
        "Free money offer, urgent!",
        "Team lunch schedule for the project meeting",
        "You you you",
        "Thanks for the review",
    ] {
        let result = pipeline.predict_single_email(text);
        assert!(
            (50.0..=100.0).contains(&result.confidence),
            "{:?} -> {:?}",
            text,
            result
        );
    }
}

#[test]
fn test_out_of_vocabulary_falls_back_to_intercept() {
    let pipeline = fixture_pipeline();
    let result = pipeline.predict_single_email("zzzz qqqq xyzzy");

    // zero vector: p(spam) = sigmoid(-0.5)
    let p_ham = 1.0 - 1.0 / (1.0 + 0.5f64.exp());
    assert_eq!(result.prediction, Label::Ham);
    assert!((result.confidence - p_ham * 100.0).abs() < 1e-6);
}

#[test]
fn test_html_and_noise_are_stripped() {
    let pipeline = fixture_pipeline();
    let result = pipeline.predict_single_email(
        "<html><body><p>FREE&nbsp;prize!!!</p><script>var meeting = 1;</script>\u{200B}</body></html>",
    );
    assert_eq!(result.prediction, Label::Spam);
}

#[test]
fn test_deterministic() {
    let pipeline = fixture_pipeline();
    let text = "Urgent: schedule the team meeting and claim your free prize";

    let first = pipeline.predict_single_email(text);
    for _ in 0..10 {
        assert_eq!(pipeline.predict_single_email(text), first);
    }
}

#[test]
fn test_concurrent_predictions_share_artifacts() {
    let pipeline = fixture_pipeline();
    let expected = pipeline.predict_single_email("winner lottery viagra");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || pipeline.predict_single_email("winner lottery viagra"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_missing_model_dir() {
    let config = PipelineConfig::default();
    let result = PipelineBuilder::new(config).model_dir("/nonexistent/spamguard/models").build();

    assert!(matches!(result, Err(SpamGuardError::ModelLoad { .. })));
}

#[test]
fn test_missing_artifact_file() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::copy(
        fixture_models().join("vectorizer.json"),
        dir.path().join("vectorizer.json"),
    )
    .unwrap();

    let mut config = PipelineConfig::default();
    config.models.dir = dir.path().to_path_buf();

    match PredictionPipeline::new(config) {
        Err(SpamGuardError::ModelLoad { path, .. }) => {
            assert_eq!(path, dir.path().join("classifier.json"));
        }
        other => panic!("expected ModelLoad error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_result_serializes_label_as_string() {
    let pipeline = fixture_pipeline();
    let result = pipeline.predict_single_email("Congratulations, you won a free prize");

    let json = serde_json::to_value(result).unwrap();
    assert_eq!(json["prediction"], "Spam");
    assert!(json["confidence"].is_f64());
}
