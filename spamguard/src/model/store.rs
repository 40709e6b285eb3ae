//! Model store
//!
//! Reads the transformer and classifier artifacts from the model directory
//! and validates them against each other. Any failure here is fatal for the
//! pipeline being constructed.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::artifacts::TrainedArtifacts;
use super::vectorizer::{TfidfSpec, TfidfVectorizer};
use crate::classifier::ClassifierSpec;
use crate::config::ModelConfig;
use crate::error::{Result, SpamGuardError};

/// Loads [`TrainedArtifacts`] from disk
#[derive(Debug, Clone)]
pub struct ModelStore {
    config: ModelConfig,
}

impl ModelStore {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn load(&self) -> Result<TrainedArtifacts> {
        let started = Instant::now();
        let dir = &self.config.dir;

        if !dir.is_dir() {
            return Err(SpamGuardError::model_load(dir, "model directory not found"));
        }

        let vectorizer_path = self.config.vectorizer_path();
        let spec: TfidfSpec = read_artifact(&vectorizer_path)?;
        let vectorizer = TfidfVectorizer::from_spec(spec)
            .map_err(|reason| SpamGuardError::model_load(&vectorizer_path, reason))?;
        debug!(
            path = %vectorizer_path.display(),
            vocabulary = vectorizer.vocabulary_size(),
            "Feature transformer loaded"
        );

        let classifier_path = self.config.classifier_path();
        let spec: ClassifierSpec = read_artifact(&classifier_path)?;
        let classifier = spec
            .build()
            .map_err(|reason| SpamGuardError::model_load(&classifier_path, reason))?;

        let artifacts = TrainedArtifacts::assemble(Box::new(vectorizer), classifier, Some(dir.clone()))
            .map_err(|e| match e {
                SpamGuardError::ModelLoad { reason, .. } => {
                    SpamGuardError::model_load(&classifier_path, reason)
                }
                other => other,
            })?;

        info!(
            dir = %dir.display(),
            classifier = artifacts.classifier().kind(),
            dimension = artifacts.dimension(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model artifacts loaded"
        );

        Ok(artifacts)
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| SpamGuardError::model_load(path, e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SpamGuardError::model_load(path, format!("invalid artifact: {}", e)))
}
