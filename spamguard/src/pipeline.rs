//! Prediction pipeline
//!
//! [`PredictionPipeline`] owns the loaded artifacts and is the entry point
//! for both the single-message and the mbox batch path. It is built once,
//! up front, and then cloned or shared by reference. Construction fails
//! when the artifacts cannot be loaded, so a pipeline value is always
//! usable.
//!
//! [`PipelineBuilder`] holds configuration without touching the model
//! directory until [`PipelineBuilder::build`] is called.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::{ModelStore, TrainedArtifacts};
use crate::normalize::TextNormalizer;
use crate::predictor::Predictor;
use crate::scanner::{MboxScanner, ReportTable};
use crate::types::PredictionResult;

#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    config: Arc<PipelineConfig>,
    predictor: Predictor,
    scanner: MboxScanner,
}

impl PredictionPipeline {
    /// Load the artifacts named by `config` and build a ready pipeline
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let artifacts = ModelStore::new(config.models.clone()).load()?;
        Ok(Self::assemble(Arc::new(config), Arc::new(artifacts)))
    }

    /// Build a pipeline around artifacts that are already loaded
    pub fn from_artifacts(artifacts: Arc<TrainedArtifacts>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(Arc::new(config), artifacts))
    }

    fn assemble(config: Arc<PipelineConfig>, artifacts: Arc<TrainedArtifacts>) -> Self {
        let predictor = Predictor::new(artifacts, TextNormalizer::new(config.normalizer.clone()));
        let scanner = MboxScanner::new(predictor.clone(), config.scanner.clone());
        Self {
            config,
            predictor,
            scanner,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &Arc<TrainedArtifacts> {
        self.predictor.artifacts()
    }

    /// Classify one message. Empty or whitespace-only text yields
    /// [`PredictionResult::EMPTY_DEFAULT`].
    pub fn predict_single_email(&self, text: &str) -> PredictionResult {
        self.predictor.predict(text)
    }

    /// Classify every message of an mbox archive, in archive order
    pub fn predict_mbox_file(&self, path: impl AsRef<Path>) -> Result<ReportTable> {
        self.predict_mbox_file_with_cancel(path, &CancellationToken::new())
    }

    /// Like [`predict_mbox_file`](Self::predict_mbox_file), stopping early
    /// once `cancel` fires. The rows collected so far are returned with
    /// [`ScanStatus::Cancelled`](crate::scanner::ScanStatus::Cancelled).
    pub fn predict_mbox_file_with_cancel(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<ReportTable> {
        self.scanner.scan(path.as_ref(), cancel)
    }

    /// Reload the artifacts from the model directory.
    ///
    /// On failure the current artifacts stay in place.
    pub fn reload(&mut self) -> Result<()> {
        let artifacts = match ModelStore::new(self.config.models.clone()).load() {
            Ok(artifacts) => artifacts,
            Err(e) => {
                warn!(error = %e, "Model reload failed, keeping current artifacts");
                return Err(e);
            }
        };

        *self = Self::assemble(self.config.clone(), Arc::new(artifacts));
        info!(dir = %self.config.models.dir.display(), "Model artifacts reloaded");
        Ok(())
    }
}

/// Deferred pipeline construction: nothing is loaded until [`build`](Self::build)
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.models.dir = dir.into();
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn build(self) -> Result<PredictionPipeline> {
        PredictionPipeline::new(self.config)
    }
}
