//! Uniform `classify(document) -> (label, confidence)` contract over the loaded artifacts

use std::sync::Arc;
use tracing::debug;

use crate::model::{FeatureVector, TrainedArtifacts};
use crate::normalize::NormalizedDocument;
use crate::types::{clamp_percentage, Label, PredictionResult};

/// Classification outcome for one document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub label: Label,
    /// Probability of `label`, as a percentage
    pub confidence: f64,
    /// The document shared no term with the vocabulary and was scored as the zero vector
    pub fallback: bool,
}

impl Verdict {
    /// Verdict for a document with no tokens; the classifier is not consulted
    pub const EMPTY_DEFAULT: Verdict = Verdict {
        label: Label::Ham,
        confidence: 0.0,
        fallback: false,
    };

    pub fn into_result(self) -> PredictionResult {
        PredictionResult::new(self.label, self.confidence)
    }
}

/// Wraps the trained transformer and classifier behind one call
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    artifacts: Arc<TrainedArtifacts>,
}

impl ClassifierAdapter {
    pub fn new(artifacts: Arc<TrainedArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Arc<TrainedArtifacts> {
        &self.artifacts
    }

    pub fn classify(&self, document: &NormalizedDocument) -> Verdict {
        let transformer = self.artifacts.transformer();

        let (features, fallback) = match transformer.transform(document) {
            Ok(features) => (features, false),
            Err(e) => {
                debug!(error = %e, "Falling back to zero feature vector");
                (FeatureVector::zeros(transformer.dimension()), true)
            }
        };

        let scores = self.artifacts.classifier().scores(&features);
        let (label, probability) = scores.best();

        Verdict {
            label,
            confidence: clamp_percentage(probability * 100.0),
            fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassScores, MockClassifier};
    use crate::error::SpamGuardError;
    use crate::model::MockFeatureTransformer;

    fn document(tokens: &[&str]) -> NormalizedDocument {
        NormalizedDocument::new(tokens.join(" "), tokens.iter().map(|t| t.to_string()).collect())
    }

    fn adapter(transformer: MockFeatureTransformer, classifier: MockClassifier) -> ClassifierAdapter {
        let artifacts = TrainedArtifacts::new(Box::new(transformer), Box::new(classifier)).unwrap();
        ClassifierAdapter::new(Arc::new(artifacts))
    }

    fn transformer_mock() -> MockFeatureTransformer {
        let mut transformer = MockFeatureTransformer::new();
        transformer.expect_dimension().return_const(3usize);
        transformer.expect_kind().return_const("mock");
        transformer
    }

    fn classifier_mock() -> MockClassifier {
        let mut classifier = MockClassifier::new();
        classifier.expect_dimension().return_const(3usize);
        classifier.expect_kind().return_const("mock");
        classifier
    }

    #[test]
    fn test_confidence_is_predicted_class_probability() {
        let mut transformer = transformer_mock();
        transformer
            .expect_transform()
            .returning(|_| Ok(FeatureVector::from_entries(3, vec![(0, 1.0)])));

        let mut classifier = classifier_mock();
        classifier
            .expect_scores()
            .times(1)
            .returning(|_| ClassScores::new(0.2, 0.8));

        let verdict = adapter(transformer, classifier).classify(&document(&["hello"]));
        assert_eq!(verdict.label, Label::Ham);
        assert!((verdict.confidence - 80.0).abs() < 1e-9);
        assert!(!verdict.fallback);
    }

    #[test]
    fn test_feature_error_degrades_to_zero_vector() {
        let mut transformer = transformer_mock();
        transformer
            .expect_transform()
            .returning(|_| Err(SpamGuardError::FeatureExtraction("out of vocabulary".to_string())));

        let mut classifier = classifier_mock();
        classifier
            .expect_scores()
            .withf(|features| features.is_zero() && features.dimension() == 3)
            .times(1)
            .returning(|_| ClassScores::new(0.7, 0.3));

        let verdict = adapter(transformer, classifier).classify(&document(&["zzz"]));
        assert_eq!(verdict.label, Label::Spam);
        assert!((verdict.confidence - 70.0).abs() < 1e-9);
        assert!(verdict.fallback);
    }

    #[test]
    fn test_deterministic() {
        let mut transformer = transformer_mock();
        transformer
            .expect_transform()
            .returning(|_| Ok(FeatureVector::from_entries(3, vec![(2, 0.5)])));

        let mut classifier = classifier_mock();
        classifier
            .expect_scores()
            .returning(|f| ClassScores::from_spam_probability(f.dot(&[0.0, 0.0, 1.8])));

        let adapter = adapter(transformer, classifier);
        let doc = document(&["same", "input"]);
        assert_eq!(adapter.classify(&doc), adapter.classify(&doc));
    }

    #[test]
    fn test_empty_default_result() {
        let result = Verdict::EMPTY_DEFAULT.into_result();
        assert_eq!(result.prediction, Label::Ham);
        assert_eq!(result.confidence, 0.0);
    }
}
