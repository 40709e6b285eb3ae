//! Binary logistic regression

use serde::{Deserialize, Serialize};

use super::{check_classes, ClassScores, Classifier};
use crate::model::FeatureVector;
use crate::types::Label;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionSpec {
    /// The second class is the positive one
    pub classes: [Label; 2],
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    positive: Label,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn from_spec(spec: LogisticRegressionSpec) -> Result<Self, String> {
        check_classes(&spec.classes)?;
        if spec.coefficients.is_empty() {
            return Err("coefficient vector is empty".to_string());
        }
        if let Some(pos) = spec.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(format!("coefficient at column {} is not finite", pos));
        }
        if !spec.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }

        Ok(Self {
            positive: spec.classes[1],
            coefficients: spec.coefficients,
            intercept: spec.intercept,
        })
    }

    /// Raw decision value `w·x + b`
    pub fn decision(&self, features: &FeatureVector) -> f64 {
        self.intercept + features.dot(&self.coefficients)
    }
}

impl Classifier for LogisticRegression {
    fn scores(&self, features: &FeatureVector) -> ClassScores {
        let p = sigmoid(self.decision(features));
        match self.positive {
            Label::Spam => ClassScores::from_spam_probability(p),
            Label::Ham => ClassScores::from_spam_probability(1.0 - p),
        }
    }

    fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(classes: [Label; 2]) -> LogisticRegression {
        LogisticRegression::from_spec(LogisticRegressionSpec {
            classes,
            coefficients: vec![2.0, -2.0],
            intercept: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_positive_class_is_second() {
        let features = FeatureVector::from_entries(2, vec![(0, 1.0)]);

        let scores = model([Label::Ham, Label::Spam]).scores(&features);
        assert!(scores.spam > 0.85);

        let scores = model([Label::Spam, Label::Ham]).scores(&features);
        assert!(scores.ham > 0.85);
    }

    #[test]
    fn test_zero_vector_uses_intercept() {
        let m = LogisticRegression::from_spec(LogisticRegressionSpec {
            classes: [Label::Ham, Label::Spam],
            coefficients: vec![1.0],
            intercept: -0.5,
        })
        .unwrap();
        let scores = m.scores(&FeatureVector::zeros(1));
        assert!((scores.spam - sigmoid(-0.5)).abs() < 1e-12);
        assert_eq!(scores.best().0, Label::Ham);
    }

    #[test]
    fn test_invalid_specs() {
        let same = LogisticRegressionSpec {
            classes: [Label::Spam, Label::Spam],
            coefficients: vec![1.0],
            intercept: 0.0,
        };
        assert!(LogisticRegression::from_spec(same).is_err());

        let nan = LogisticRegressionSpec {
            classes: [Label::Ham, Label::Spam],
            coefficients: vec![f64::INFINITY],
            intercept: 0.0,
        };
        assert!(LogisticRegression::from_spec(nan).is_err());
    }
}
