//! Trained model artifacts
//!
//! Holds the feature transformer and classifier for the lifetime of the
//! process and loads them from the model directory.

pub mod artifacts;
pub mod store;
pub mod transformer;
pub mod vectorizer;

pub use artifacts::{ArtifactSummary, TrainedArtifacts};
pub use store::ModelStore;
pub use transformer::{FeatureTransformer, FeatureVector};
pub use vectorizer::{Norm, TfidfSpec, TfidfVectorizer};

#[cfg(test)]
pub use transformer::MockFeatureTransformer;
