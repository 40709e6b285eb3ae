//! Report export
//!
//! Writes the full scan report as CSV (one row per classified message) or
//! JSON (rows plus skipped records and scan status).

use anyhow::Context;
use clap::ValueEnum;
use spamguard::{EmailRecord, ReportTable};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const CSV_HEADER: [&str; 5] = ["Time", "Subject", "Body", "Prediction", "Confidence"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Final export path. A directory target gets a timestamped file name.
pub fn resolve_path(target: &Path, format: ExportFormat, unix_seconds: i64) -> PathBuf {
    if target.is_dir() {
        target.join(format!("spamguard_report_{}.{}", unix_seconds, format.extension()))
    } else {
        target.to_path_buf()
    }
}

/// Write `table` to `target` and return the path actually written
pub fn export(table: &ReportTable, target: &Path, format: ExportFormat) -> anyhow::Result<PathBuf> {
    let path = resolve_path(target, format, chrono::Utc::now().timestamp());
    let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(table, &mut writer)?,
        ExportFormat::Json => serde_json::to_writer_pretty(&mut writer, table)?,
    }
    writer.flush()?;

    Ok(path)
}

pub fn write_csv<W: Write>(table: &ReportTable, writer: &mut W) -> anyhow::Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for record in table {
        writeln!(writer, "{}", csv_row(record))?;
    }
    Ok(())
}

fn csv_row(record: &EmailRecord) -> String {
    let time = record.time.map(|t| t.to_rfc3339()).unwrap_or_default();
    let confidence = format!("{:.2}", record.confidence);
    [
        time.as_str(),
        record.subject.as_str(),
        record.body.as_str(),
        record.prediction.as_str(),
        confidence.as_str(),
    ]
    .iter()
    .map(|field| escape(field))
    .collect::<Vec<_>>()
    .join(",")
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
