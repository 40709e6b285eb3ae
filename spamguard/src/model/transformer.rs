//! Feature vectors and the transformer seam

use crate::error::Result;
use crate::normalize::NormalizedDocument;

/// Sparse numeric feature vector with entries sorted by column index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// The all-zero vector, used when a document cannot be vectorized
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Out-of-range indices and zero values are dropped,
    /// duplicate indices are summed.
    pub fn from_entries(dimension: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut sorted: Vec<(usize, f64)> = entries
            .into_iter()
            .filter(|(index, _)| *index < dimension)
            .collect();
        sorted.sort_by_key(|(index, _)| *index);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(sorted.len());
        for (index, value) in sorted {
            match merged.last_mut() {
                Some((last, sum)) if *last == index => *sum += value,
                _ => merged.push((index, value)),
            }
        }
        merged.retain(|(_, value)| *value != 0.0);

        Self {
            dimension,
            entries: merged,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense weight vector; missing weights count as zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(index, value)| weights.get(*index).copied().unwrap_or(0.0) * value)
            .sum()
    }
}

/// Maps a normalized document onto a fixed-size feature vector
#[cfg_attr(test, mockall::automock)]
pub trait FeatureTransformer: Send + Sync {
    /// Vectorize a document.
    ///
    /// Fails with `SpamGuardError::FeatureExtraction` when the document shares
    /// nothing with the transformer's vocabulary.
    fn transform(&self, document: &NormalizedDocument) -> Result<FeatureVector>;

    /// Width of every produced vector
    fn dimension(&self) -> usize;

    fn kind(&self) -> &'static str;
}
