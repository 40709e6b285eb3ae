//! Text normalization
//!
//! Turns raw email text into the lower-cased, noise-free token stream the
//! feature transformer consumes.

pub mod normalizer;
pub mod types;

pub use normalizer::TextNormalizer;
pub use types::NormalizedDocument;
