//! Lumipage CLI
//!
//! Loads a DOM snapshot (the nested JSON an extraction script produces),
//! runs an annotation session over it, and prints the requested bulk-export
//! payloads to stdout. Stands in for the floating control panel when
//! working against captured page snapshots.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lumipage::{Category, ClassifierConfig, Document, Session, StdoutClipboard};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportMode {
    /// All clickable-marked elements
    Clickable,
    /// All text-marked elements
    Text,
    /// Both exports, clickable first
    All,
}

#[derive(Parser)]
#[command(name = "lumipage")]
#[command(version)]
#[command(about = "Annotate a DOM snapshot and export element records", long_about = None)]
struct Cli {
    /// Path to the DOM snapshot JSON file
    snapshot: PathBuf,

    /// Document title used in the exported `tags` field
    #[arg(long, default_value = "")]
    title: String,

    /// Path to a classifier configuration JSON file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Which bulk export(s) to run
    #[arg(long, short = 'e', value_enum, default_value = "all")]
    export: ExportMode,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let snapshot = fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("failed to read snapshot {}", cli.snapshot.display()))?;
    let doc = Document::from_snapshot_json(&snapshot, &cli.title)
        .context("failed to parse DOM snapshot")?;

    let config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<ClassifierConfig>(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => ClassifierConfig::default(),
    };

    let mut session = Session::new(doc, config, StdoutClipboard);
    session.activate();
    eprintln!("{} element(s) annotated", session.annotation_count());

    let categories: &[Category] = match cli.export {
        ExportMode::Clickable => &[Category::Clickable],
        ExportMode::Text => &[Category::Text],
        ExportMode::All => &[Category::Clickable, Category::Text],
    };
    for category in categories {
        let count = session
            .export(*category)
            .with_context(|| format!("failed to export {category} records"))?;
        eprintln!("{count} {category} record(s) exported");
    }

    session.deactivate();
    Ok(())
}
