//! Classifier abstraction
//!
//! Concrete models sit behind the [`Classifier`] trait so the rest of the
//! pipeline never touches a model's native representation. The
//! [`ClassifierAdapter`] turns a normalized document into a verdict.

use serde::{Deserialize, Serialize};

use crate::model::FeatureVector;
use crate::types::Label;

pub mod adapter;
pub mod bayes;
pub mod linear;

pub use adapter::{ClassifierAdapter, Verdict};
pub use bayes::{MultinomialNaiveBayes, MultinomialNbSpec};
pub use linear::{LogisticRegression, LogisticRegressionSpec};

/// Probability distribution over {Spam, Ham}
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScores {
    pub spam: f64,
    pub ham: f64,
}

impl ClassScores {
    /// Scores rescaled to sum to one. Degenerate input becomes an even split.
    pub fn new(spam: f64, ham: f64) -> Self {
        let total = spam + ham;
        if !total.is_finite() || total <= 0.0 || spam < 0.0 || ham < 0.0 {
            return Self { spam: 0.5, ham: 0.5 };
        }
        Self {
            spam: spam / total,
            ham: ham / total,
        }
    }

    pub fn from_spam_probability(p: f64) -> Self {
        Self::new(p, 1.0 - p)
    }

    pub fn score(&self, label: Label) -> f64 {
        match label {
            Label::Spam => self.spam,
            Label::Ham => self.ham,
        }
    }

    /// Highest-scoring class and its score. A tie goes to Ham.
    pub fn best(&self) -> (Label, f64) {
        let label = if self.spam > self.ham { Label::Spam } else { Label::Ham };
        (label, self.score(label))
    }
}

/// A trained model producing class scores from feature vectors
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    fn scores(&self, features: &FeatureVector) -> ClassScores;

    /// Number of features the model was trained on
    fn dimension(&self) -> usize;

    fn kind(&self) -> &'static str;
}

/// On-disk classifier artifact, tagged by model family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression(LogisticRegressionSpec),
    #[serde(rename = "multinomial_nb")]
    MultinomialNb(MultinomialNbSpec),
}

impl ClassifierSpec {
    /// Validate the artifact and build the model. The error is a human-readable reason.
    pub fn build(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ClassifierSpec::LogisticRegression(spec) => {
                Ok(Box::new(LogisticRegression::from_spec(spec)?))
            }
            ClassifierSpec::MultinomialNb(spec) => {
                Ok(Box::new(MultinomialNaiveBayes::from_spec(spec)?))
            }
        }
    }
}

pub(crate) fn check_classes(classes: &[Label; 2]) -> Result<(), String> {
    if classes[0] == classes[1] {
        return Err(format!("classes must be distinct, got {:?}", classes));
    }
    Ok(())
}
