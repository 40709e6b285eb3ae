//! Report table produced by a batch scan

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::types::Label;

/// One classified message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailRecord {
    pub time: Option<DateTime<FixedOffset>>,
    pub subject: String,
    pub body: String,
    pub prediction: Label,
    pub confidence: f64,
}

/// A record dropped as malformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// 1-based position in the archive
    pub index: u64,
    /// Line of the record's `From ` separator
    pub line: u64,
    pub reason: String,
}

/// How a scan ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Completed,
    Cancelled,
}

/// Rows in archive order plus scan bookkeeping
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTable {
    rows: Vec<EmailRecord>,
    skipped: Vec<SkippedRecord>,
    fallback_count: usize,
    status: ScanStatus,
}

impl ReportTable {
    pub const COLUMNS: [&'static str; 4] = ["Time", "Subject", "Prediction", "Confidence"];

    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: EmailRecord, fallback: bool) {
        if fallback {
            self.fallback_count += 1;
        }
        self.rows.push(record);
    }

    pub(crate) fn skip(&mut self, record: SkippedRecord) {
        self.skipped.push(record);
    }

    pub(crate) fn set_status(&mut self, status: ScanStatus) {
        self.status = status;
    }

    /// First `n` rows, in archive order
    pub fn head(&self, n: usize) -> &[EmailRecord] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn rows(&self) -> &[EmailRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmailRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn spam_count(&self) -> usize {
        self.rows.iter().filter(|r| r.prediction.is_spam()).count()
    }

    pub fn ham_count(&self) -> usize {
        self.len() - self.spam_count()
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Rows classified through the zero-vector fallback
    pub fn fallback_count(&self) -> usize {
        self.fallback_count
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }
}

impl<'a> IntoIterator for &'a ReportTable {
    type Item = &'a EmailRecord;
    type IntoIter = std::slice::Iter<'a, EmailRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
