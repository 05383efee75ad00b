//! OCR command - recognize menu items in local image files.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use menuscan_core::{FailurePolicy, ImageIngest, MenuStore, ParsedItem};

use super::{build_recognizer, format_parsed, load_config, OutputFormat};

/// Arguments for the ocr command.
#[derive(Args)]
pub struct OcrArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also persist the recognized items
    #[arg(long)]
    store: bool,

    /// SQLite database file (with --store)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

pub fn run(args: OcrArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if let Some(dir) = args.model_dir {
        config.ocr.model_dir = dir;
    }
    if let Some(db) = args.db {
        config.store.database_path = db;
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(
                ext.to_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tiff"
            )
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching image files found for pattern: {}", args.input);
    }

    let recognizer = build_recognizer(&config)?;

    if args.store {
        let store = MenuStore::open(&config.store.database_path, config.store.reingest)?;
        let policy = if args.continue_on_error {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        };
        let ingest = ImageIngest::new(recognizer, store).with_failure_policy(policy);

        let report = ingest.ingest_images(&files)?;
        println!("{}", format_parsed(&report.items, args.format)?);
        eprintln!(
            "{} Stored {} item(s) from {} image(s) in {}",
            style("✓").green(),
            report.stored,
            report.images.len(),
            config.store.database_path.display()
        );
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")?
            .progress_chars("=>-"),
    );

    let mut items: Vec<ParsedItem> = Vec::new();
    let mut failed = 0usize;

    for path in &files {
        match recognizer.recognize_file(path) {
            Ok(found) => items.extend(found),
            Err(e) if args.continue_on_error => {
                warn!("Failed to process {}: {}", path.display(), e);
                failed += 1;
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to process {}: {}", path.display(), e);
                anyhow::bail!("Processing failed: {}", e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("{}", format_parsed(&items, args.format)?);
    eprintln!(
        "{} {} item(s) from {} image(s) in {:?}{}",
        style("✓").green(),
        items.len(),
        files.len() - failed,
        start.elapsed(),
        if failed > 0 {
            format!(", {} failed", failed)
        } else {
            String::new()
        }
    );

    Ok(())
}
