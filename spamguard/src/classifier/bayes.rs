//! Multinomial naive Bayes
//!
//! Scores are computed in log space: the joint log-likelihood of each class
//! is its log prior plus the feature-weighted log probabilities of the
//! terms, then turned into a distribution with log-sum-exp.

use serde::{Deserialize, Serialize};

use super::{check_classes, ClassScores, Classifier};
use crate::model::FeatureVector;
use crate::types::Label;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNbSpec {
    pub classes: [Label; 2],
    /// Log prior per class, in `classes` order
    pub class_log_prior: Vec<f64>,
    /// Per class, the log probability of each feature column
    pub feature_log_prob: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct MultinomialNaiveBayes {
    classes: [Label; 2],
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

impl MultinomialNaiveBayes {
    pub fn from_spec(spec: MultinomialNbSpec) -> Result<Self, String> {
        check_classes(&spec.classes)?;

        let [prior_a, prior_b] = <[f64; 2]>::try_from(spec.class_log_prior.as_slice())
            .map_err(|_| format!("expected 2 class priors, got {}", spec.class_log_prior.len()))?;
        if !prior_a.is_finite() || !prior_b.is_finite() {
            return Err("class log prior is not finite".to_string());
        }

        let rows = spec.feature_log_prob.len();
        let [probs_a, probs_b]: [Vec<f64>; 2] = spec
            .feature_log_prob
            .try_into()
            .map_err(|_| format!("expected 2 rows of feature log probabilities, got {}", rows))?;

        if probs_a.is_empty() || probs_a.len() != probs_b.len() {
            return Err(format!(
                "feature log probability rows have mismatched lengths {} and {}",
                probs_a.len(),
                probs_b.len()
            ));
        }
        if probs_a.iter().chain(probs_b.iter()).any(|p| !p.is_finite()) {
            return Err("feature log probability is not finite".to_string());
        }

        Ok(Self {
            classes: spec.classes,
            class_log_prior: [prior_a, prior_b],
            feature_log_prob: [probs_a, probs_b],
        })
    }

    /// Joint log-likelihood per class, in `classes` order
    fn joint_log_likelihood(&self, features: &FeatureVector) -> [f64; 2] {
        [
            self.class_log_prior[0] + features.dot(&self.feature_log_prob[0]),
            self.class_log_prior[1] + features.dot(&self.feature_log_prob[1]),
        ]
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn scores(&self, features: &FeatureVector) -> ClassScores {
        let jll = self.joint_log_likelihood(features);
        let max = jll[0].max(jll[1]);
        let a = (jll[0] - max).exp();
        let b = (jll[1] - max).exp();

        let (spam, ham) = match self.classes[0] {
            Label::Spam => (a, b),
            Label::Ham => (b, a),
        };
        ClassScores::new(spam, ham)
    }

    fn dimension(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    fn kind(&self) -> &'static str {
        "multinomial_nb"
    }
}
