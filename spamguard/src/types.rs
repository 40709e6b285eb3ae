//! Verdict types shared by the single-message and batch paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class predicted for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(alias = "spam", alias = "SPAM")]
    Spam,
    #[serde(alias = "ham", alias = "HAM")]
    Ham,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "Spam",
            Label::Ham => "Ham",
        }
    }

    pub fn is_spam(&self) -> bool {
        matches!(self, Label::Spam)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class
    pub prediction: Label,
    /// Probability of `prediction` as a percentage in [0, 100]
    pub confidence: f64,
}

impl PredictionResult {
    /// Result returned for input with nothing left to classify
    pub const EMPTY_DEFAULT: PredictionResult = PredictionResult {
        prediction: Label::Ham,
        confidence: 0.0,
    };

    pub fn new(prediction: Label, confidence: f64) -> Self {
        Self {
            prediction,
            confidence: clamp_percentage(confidence),
        }
    }
}

pub(crate) fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
