//! spamguard: spam/ham prediction for single emails and mbox archives
//!
//! The pipeline normalizes raw message text, turns it into a feature
//! vector with a trained TF-IDF transformer and scores it with a trained
//! classifier. Models are loaded once, when the pipeline is built, and
//! shared read-only by every prediction.
//!
//! # Example
//!
//! ```no_run
//! use spamguard::{PipelineConfig, PredictionPipeline};
//!
//! fn main() -> spamguard::Result<()> {
//!     let pipeline = PredictionPipeline::new(PipelineConfig::default())?;
//!
//!     let verdict = pipeline.predict_single_email("Congratulations! You won!");
//!     println!("{} ({:.1}%)", verdict.prediction, verdict.confidence);
//!
//!     let report = pipeline.predict_mbox_file("inbox.mbox")?;
//!     for row in report.head(10) {
//!         println!("{} {}", row.prediction, row.subject);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod predictor;
pub mod scanner;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Result, SpamGuardError};
pub use pipeline::{PipelineBuilder, PredictionPipeline};
pub use scanner::{EmailRecord, ReportTable, ScanStatus, SkippedRecord};
pub use types::{Label, PredictionResult};
