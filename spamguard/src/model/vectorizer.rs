//! TF-IDF feature transformer
//!
//! Reproduces the usual term-frequency × inverse-document-frequency scheme
//! over a fixed vocabulary, with optional stop words, English stemming and
//! word n-grams. The vocabulary and IDF weights come from a trained artifact.

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::transformer::{FeatureTransformer, FeatureVector};
use crate::error::{Result, SpamGuardError};
use crate::normalize::NormalizedDocument;

/// Vector normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk form of a trained TF-IDF transformer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfSpec {
    /// Term to column index
    pub vocabulary: HashMap<String, usize>,
    /// IDF weight per column
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub stop_words: Vec<String>,
    /// Apply English Snowball stemming to tokens before lookup
    #[serde(default)]
    pub stem: bool,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// TF-IDF transformer over a fixed vocabulary
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    binary: bool,
    norm: Option<Norm>,
    stop_words: HashSet<String>,
    stemmer: Option<Stemmer>,
}

impl TfidfVectorizer {
    /// Validate a spec and build the transformer. The error is a human-readable reason.
    pub fn from_spec(spec: TfidfSpec) -> std::result::Result<Self, String> {
        let dimension = spec.idf.len();
        if dimension == 0 {
            return Err("idf vector is empty".to_string());
        }
        if spec.vocabulary.len() != dimension {
            return Err(format!(
                "vocabulary has {} terms but idf has {} weights",
                spec.vocabulary.len(),
                dimension
            ));
        }

        let mut seen = vec![false; dimension];
        for (term, &index) in &spec.vocabulary {
            if index >= dimension {
                return Err(format!("term '{}' maps to column {} (dimension {})", term, index, dimension));
            }
            if seen[index] {
                return Err(format!("column {} is assigned to more than one term", index));
            }
            seen[index] = true;
        }

        if let Some(pos) = spec.idf.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(format!("idf weight at column {} is not a positive number", pos));
        }

        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({}, {})", min_n, max_n));
        }

        Ok(Self {
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            ngram_range: spec.ngram_range,
            sublinear_tf: spec.sublinear_tf,
            binary: spec.binary,
            norm: spec.norm,
            stop_words: spec.stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
            stemmer: spec.stem.then(|| Stemmer::create(Algorithm::English)),
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Terms looked up in the vocabulary: stop words removed, optionally stemmed, expanded to n-grams
    fn terms(&self, tokens: &[String]) -> Vec<String> {
        let words: Vec<String> = tokens
            .iter()
            .filter(|t| !self.stop_words.contains(t.as_str()))
            .map(|t| match &self.stemmer {
                Some(stemmer) => stemmer.stem(t).into_owned(),
                None => t.clone(),
            })
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(words.iter().cloned());
            } else {
                terms.extend(words.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }

    fn weight(&self, count: f64, index: usize) -> f64 {
        let tf = if self.binary {
            1.0
        } else if self.sublinear_tf {
            1.0 + count.ln()
        } else {
            count
        };
        tf * self.idf[index]
    }
}

impl FeatureTransformer for TfidfVectorizer {
    fn transform(&self, document: &NormalizedDocument) -> Result<FeatureVector> {
        let terms = self.terms(&document.tokens);

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in &terms {
            if let Some(&index) = self.vocabulary.get(term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        if counts.is_empty() {
            return Err(SpamGuardError::FeatureExtraction(format!(
                "none of {} terms are in the vocabulary",
                terms.len()
            )));
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, self.weight(count, index)))
            .collect();
        entries.sort_by_key(|(index, _)| *index);

        let length = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if length > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= length;
            }
        }

        Ok(FeatureVector::from_entries(self.idf.len(), entries))
    }

    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn kind(&self) -> &'static str {
        "tfidf"
    }
}

impl fmt::Debug for TfidfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfidfVectorizer")
            .field("dimension", &self.idf.len())
            .field("ngram_range", &self.ngram_range)
            .field("sublinear_tf", &self.sublinear_tf)
            .field("binary", &self.binary)
            .field("norm", &self.norm)
            .field("stop_words", &self.stop_words.len())
            .field("stem", &self.stemmer.is_some())
            .finish()
    }
}
