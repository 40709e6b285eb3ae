//! spamguard: email threat scanner
//!
//! # Usage
//!
//! ```bash
//! # Classify one message
//! spamguard scan-text "Congratulations! You won!"
//! spamguard scan-text --file message.txt --json
//! cat message.txt | spamguard scan-text
//!
//! # Scan an mbox archive and export the report
//! spamguard scan-mbox inbox.mbox --head 20 --export reports/ --format csv
//!
//! # Inspect the loaded models
//! spamguard --config spamguard.toml models
//!
//! # Write a default configuration file
//! spamguard init-config spamguard.toml
//! ```

mod export;
mod logging;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use export::ExportFormat;
use spamguard::{PipelineConfig, PredictionPipeline, ReportTable};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "spamguard", version)]
#[command(about = "Classify emails and mbox archives as spam or ham", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single message
    ScanText {
        /// Message text; read from stdin when neither this nor --file is given
        text: Option<String>,
        /// Read the message from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify every message of an mbox archive
    ScanMbox {
        /// Path to the mbox file
        path: PathBuf,
        /// Number of rows to preview
        #[arg(long, default_value_t = 10)]
        head: usize,
        /// Write the full report to this file or directory
        #[arg(short, long)]
        export: Option<PathBuf>,
        /// Report format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Load the models and print a summary
    Models,
    /// Write the default configuration
    InitConfig {
        /// Destination; printed to stdout when omitted
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        config,
        verbose,
        command,
    } = Cli::parse();

    match command {
        Commands::InitConfig { path, force } => init_config(path.as_deref(), force),
        Commands::ScanText { text, file, json } => {
            let pipeline = start(config.as_deref(), verbose)?;
            scan_text(&pipeline, text, file, json)
        }
        Commands::ScanMbox {
            path,
            head,
            export,
            format,
        } => {
            let pipeline = start(config.as_deref(), verbose)?;
            scan_mbox(&pipeline, path, head, export, format).await
        }
        Commands::Models => {
            let pipeline = start(config.as_deref(), verbose)?;
            let summary = pipeline.artifacts().summary();
            println!("Transformer: {}", summary.transformer);
            println!("Classifier:  {}", summary.classifier);
            println!("Features:    {}", summary.dimension);
            if let Some(source) = &summary.source {
                println!("Source:      {}", source.display());
            }
            println!("Loaded at:   {}", summary.loaded_at.to_rfc3339());
            Ok(())
        }
    }
}

/// Load configuration, install logging and build the pipeline
fn start(config_path: Option<&Path>, verbose: bool) -> anyhow::Result<PredictionPipeline> {
    let config = PipelineConfig::load(config_path).context("failed to load configuration")?;
    logging::init(&config.logging, verbose)?;

    info!("Starting spamguard v{}", env!("CARGO_PKG_VERSION"));
    PredictionPipeline::new(config).context("failed to load models")
}

fn scan_text(
    pipeline: &PredictionPipeline,
    text: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let payload = match (text, file) {
        (Some(text), _) => text,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("cannot read {}", file.display()))?,
        (None, None) => std::io::read_to_string(std::io::stdin()).context("cannot read stdin")?,
    };

    if payload.trim().is_empty() {
        bail!("payload missing: nothing to scan");
    }

    let result = pipeline.predict_single_email(&payload);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.prediction.is_spam() {
        println!("THREAT IDENTIFIED: SPAM");
    } else {
        println!("CLEAN: NO THREAT");
    }
    if result.confidence > 0.0 {
        println!("Confidence: {:.1}%", result.confidence);
    }
    Ok(())
}

async fn scan_mbox(
    pipeline: &PredictionPipeline,
    path: PathBuf,
    head: usize,
    export_target: Option<PathBuf>,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping scan");
            on_interrupt.cancel();
        }
    });

    let table = {
        let pipeline = pipeline.clone();
        let scan_path = path.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || pipeline.predict_mbox_file_with_cancel(&scan_path, &cancel))
            .await
            .context("scan task failed")?
            .with_context(|| format!("failed to scan {}", path.display()))?
    };

    print_summary(&table);
    print_head(&table, head);

    if let Some(target) = export_target {
        let written = export::export(&table, &target, format)?;
        println!("\nReport written to {}", written.display());
    }

    if table.status() == spamguard::ScanStatus::Cancelled {
        bail!("scan of {} was interrupted", path.display());
    }
    Ok(())
}

fn print_summary(table: &ReportTable) {
    println!("Total:   {}", table.len());
    println!("Threats: {}", table.spam_count());
    println!("Safe:    {}", table.ham_count());
    println!("Skipped: {}", table.skipped().len());
    if table.fallback_count() > 0 {
        println!("Unknown vocabulary: {}", table.fallback_count());
    }
}

fn print_head(table: &ReportTable, n: usize) {
    if table.is_empty() || n == 0 {
        return;
    }

    println!();
    println!("{:<25} {:<50} {:<10}", "Time", "Subject", "Prediction");
    println!("{:-<87}", "");
    for record in table.head(n) {
        let time = record
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S %z").to_string())
            .unwrap_or_default();
        println!(
            "{:<25} {:<50} {:<10}",
            time,
            truncate(&record.subject, 50),
            record.prediction.as_str()
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let rendered = PipelineConfig::default().to_toml()?;

    match path {
        None => print!("{}", rendered),
        Some(path) => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(path, rendered).with_context(|| format!("cannot write {}", path.display()))?;
            println!("Configuration written to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_mbox() {
        let cli = Cli::try_parse_from([
            "spamguard", "-v", "scan-mbox", "inbox.mbox", "--head", "5", "--export", "out", "--format", "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::ScanMbox {
                path,
                head,
                export,
                format,
            } => {
                assert_eq!(path, PathBuf::from("inbox.mbox"));
                assert_eq!(head, 5);
                assert_eq!(export, Some(PathBuf::from("out")));
                assert_eq!(format, ExportFormat::Json);
            }
            _ => panic!("expected scan-mbox"),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Cli::try_parse_from(["spamguard", "scan-text", "hello", "--file", "msg.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer subject line", 10), "a much ...");
    }

    #[test]
    fn test_init_config_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("spamguard.toml");

        init_config(Some(&path), false).unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap(), PipelineConfig::default());

        assert!(init_config(Some(&path), false).is_err());
        assert!(init_config(Some(&path), true).is_ok());
    }
}
