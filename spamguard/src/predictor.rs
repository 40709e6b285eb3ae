//! Single-message predictor: normalize, classify, return

use std::sync::Arc;
use tracing::debug;

use crate::classifier::{ClassifierAdapter, Verdict};
use crate::model::TrainedArtifacts;
use crate::normalize::TextNormalizer;
use crate::types::PredictionResult;

#[derive(Debug, Clone)]
pub struct Predictor {
    normalizer: TextNormalizer,
    adapter: ClassifierAdapter,
}

impl Predictor {
    pub fn new(artifacts: Arc<TrainedArtifacts>, normalizer: TextNormalizer) -> Self {
        Self {
            normalizer,
            adapter: ClassifierAdapter::new(artifacts),
        }
    }

    pub fn predict(&self, text: &str) -> PredictionResult {
        self.evaluate(text).into_result()
    }

    /// Like [`predict`](Self::predict) but keeps the fallback flag
    pub fn evaluate(&self, text: &str) -> Verdict {
        let document = self.normalizer.normalize(text);
        if document.is_empty() {
            debug!("No tokens after normalization, returning default verdict");
            return Verdict::EMPTY_DEFAULT;
        }

        let verdict = self.adapter.classify(&document);
        debug!(
            tokens = document.token_count(),
            label = %verdict.label,
            confidence = verdict.confidence,
            fallback = verdict.fallback,
            "Message classified"
        );
        verdict
    }

    pub fn artifacts(&self) -> &Arc<TrainedArtifacts> {
        self.adapter.artifacts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassScores, MockClassifier};
    use crate::model::{FeatureVector, MockFeatureTransformer};
    use crate::types::Label;

    fn predictor(classifier: MockClassifier) -> Predictor {
        let mut transformer = MockFeatureTransformer::new();
        transformer.expect_dimension().return_const(1usize);
        transformer.expect_kind().return_const("mock");
        transformer
            .expect_transform()
            .returning(|_| Ok(FeatureVector::from_entries(1, vec![(0, 1.0)])));

        let artifacts = TrainedArtifacts::new(Box::new(transformer), Box::new(classifier)).unwrap();
        Predictor::new(Arc::new(artifacts), TextNormalizer::default())
    }

    #[test]
    fn test_empty_input_skips_classifier() {
        let mut classifier = MockClassifier::new();
        classifier.expect_dimension().return_const(1usize);
        classifier.expect_kind().return_const("mock");
        classifier.expect_scores().never();

        let predictor = predictor(classifier);
        assert_eq!(predictor.predict(""), PredictionResult::EMPTY_DEFAULT);
        assert_eq!(predictor.predict("   \n\t "), PredictionResult::EMPTY_DEFAULT);
        assert_eq!(predictor.predict("<p></p>"), PredictionResult::EMPTY_DEFAULT);
    }

    #[test]
    fn test_predict_uses_classifier() {
        let mut classifier = MockClassifier::new();
        classifier.expect_dimension().return_const(1usize);
        classifier.expect_kind().return_const("mock");
        classifier
            .expect_scores()
            .times(2)
            .returning(|_| ClassScores::new(0.9, 0.1));

        let predictor = predictor(classifier);
        let first = predictor.predict("Win a free prize");
        let second = predictor.predict("Win a free prize");
        assert_eq!(first.prediction, Label::Spam);
        assert!((first.confidence - 90.0).abs() < 1e-9);
        assert_eq!(first, second);
    }
}
