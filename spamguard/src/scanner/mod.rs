//! Mbox batch scanner
//!
//! Streams an mbox archive record by record, classifies each message and
//! collects the verdicts into a [`ReportTable`]. Malformed records are
//! skipped and listed on the table; only a file that cannot be opened,
//! read, or recognized as mbox fails the whole scan.

pub mod message;
pub mod reader;
pub mod report;

pub use message::{parse_record, ParsedMessage};
pub use reader::{MboxReader, MboxRecord};
pub use report::{EmailRecord, ReportTable, ScanStatus, SkippedRecord};

use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ScannerConfig;
use crate::error::{Result, SpamGuardError};
use crate::predictor::Predictor;

#[derive(Debug, Clone)]
pub struct MboxScanner {
    predictor: Predictor,
    config: ScannerConfig,
}

impl MboxScanner {
    pub fn new(predictor: Predictor, config: ScannerConfig) -> Self {
        Self { predictor, config }
    }

    /// Scan `path`, checking `cancel` between messages
    pub fn scan(&self, path: &Path, cancel: &CancellationToken) -> Result<ReportTable> {
        let started = Instant::now();
        let file = File::open(path).map_err(|e| SpamGuardError::archive_read(path, e))?;
        let mut reader = MboxReader::new(file, self.config.max_message_bytes);
        let mut table = ReportTable::new();

        info!(path = %path.display(), "Scanning mbox archive");

        loop {
            if cancel.is_cancelled() {
                warn!(
                    path = %path.display(),
                    classified = table.len(),
                    "Scan cancelled"
                );
                table.set_status(ScanStatus::Cancelled);
                break;
            }

            let Some(record) = reader
                .read_record()
                .map_err(|e| SpamGuardError::archive_read(path, e))?
            else {
                break;
            };

            let parsed = match parse_record(&record) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(
                        index = record.index,
                        line = record.line,
                        error = %e,
                        "Skipping malformed record"
                    );
                    table.skip(SkippedRecord {
                        index: record.index,
                        line: record.line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let verdict = self.predictor.evaluate(&parsed.classification_text());
            debug!(index = record.index, label = %verdict.label, "Record classified");

            let ParsedMessage { time, subject, body } = parsed;
            table.push(
                EmailRecord {
                    time,
                    subject,
                    body: self.preview(body),
                    prediction: verdict.label,
                    confidence: verdict.confidence,
                },
                verdict.fallback,
            );
        }

        info!(
            path = %path.display(),
            records = reader.record_count(),
            classified = table.len(),
            spam = table.spam_count(),
            skipped = table.skipped().len(),
            fallback = table.fallback_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Mbox scan finished"
        );

        Ok(table)
    }

    fn preview(&self, body: String) -> String {
        match self.config.body_preview_chars {
            Some(limit) if body.chars().count() > limit => body.chars().take(limit).collect(),
            _ => body,
        }
    }
}
