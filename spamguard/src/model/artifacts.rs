use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::transformer::FeatureTransformer;
use crate::classifier::Classifier;
use crate::error::{Result, SpamGuardError};

/// Immutable bundle of a feature transformer and the classifier trained on its output.
///
/// Loaded once and shared read-only (behind an `Arc`) by every prediction.
pub struct TrainedArtifacts {
    transformer: Box<dyn FeatureTransformer>,
    classifier: Box<dyn Classifier>,
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

/// Printable description of a loaded artifact set
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub transformer: &'static str,
    pub classifier: &'static str,
    pub dimension: usize,
    pub source: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
}

impl TrainedArtifacts {
    /// Bundle in-memory parts. Fails when the two disagree on the feature dimension.
    pub fn new(
        transformer: Box<dyn FeatureTransformer>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self> {
        Self::assemble(transformer, classifier, None)
    }

    pub(crate) fn assemble(
        transformer: Box<dyn FeatureTransformer>,
        classifier: Box<dyn Classifier>,
        source: Option<PathBuf>,
    ) -> Result<Self> {
        if transformer.dimension() != classifier.dimension() {
            return Err(SpamGuardError::model_load(
                source.clone().unwrap_or_else(|| PathBuf::from("<in-memory>")),
                format!(
                    "classifier expects {} features but transformer produces {}",
                    classifier.dimension(),
                    transformer.dimension()
                ),
            ));
        }

        Ok(Self {
            transformer,
            classifier,
            source,
            loaded_at: Utc::now(),
        })
    }

    pub fn transformer(&self) -> &dyn FeatureTransformer {
        self.transformer.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn dimension(&self) -> usize {
        self.transformer.dimension()
    }

    /// Directory the artifacts were read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            transformer: self.transformer.kind(),
            classifier: self.classifier.kind(),
            dimension: self.dimension(),
            source: self.source.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

impl fmt::Debug for TrainedArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedArtifacts")
            .field("transformer", &self.transformer.kind())
            .field("classifier", &self.classifier.kind())
            .field("dimension", &self.dimension())
            .field("source", &self.source)
            .finish()
    }
}
