use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpamGuardError {
    /// Trained artifacts are missing, unreadable or inconsistent.
    #[error("Model load error ({path}): {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// The archive could not be opened or is not mbox-shaped.
    #[error("Archive read error ({path}): {reason}")]
    ArchiveRead { path: PathBuf, reason: String },

    #[error("Feature extraction error: {0}")]
    FeatureExtraction(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpamGuardError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn archive_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArchiveRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error makes the whole call unusable rather than one message.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::FeatureExtraction(_) | Self::MalformedRecord(_))
    }
}

pub type Result<T> = std::result::Result<T, SpamGuardError>;
