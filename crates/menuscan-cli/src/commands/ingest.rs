//! Ingest command - scrape a restaurant page and store its menu items.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use menuscan_core::{FailurePolicy, ImageFetcher, IngestPipeline, MenuStore, ReingestPolicy};

use super::{build_recognizer, load_config};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Restaurant page URL
    #[arg(required = true)]
    url: String,

    /// Directory downloaded images are written to
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip images that fail instead of aborting the run
    #[arg(long)]
    continue_on_error: bool,

    /// Do not insert items that are already stored
    #[arg(long)]
    dedupe: bool,

    /// Print the full run report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(dir) = args.image_dir {
        config.scraper.image_dir = dir;
    }
    if let Some(db) = args.db {
        config.store.database_path = db;
    }
    if let Some(dir) = args.model_dir {
        config.ocr.model_dir = dir;
    }
    if args.continue_on_error {
        config.pipeline.failure_policy = FailurePolicy::Skip;
    }
    if args.dedupe {
        config.store.reingest = ReingestPolicy::SkipExisting;
    }

    info!("Loading OCR models from {}", config.ocr.model_dir.display());
    let recognizer = build_recognizer(&config)?;
    let store = MenuStore::open(&config.store.database_path, config.store.reingest)?;
    let fetcher = ImageFetcher::new(&config.scraper)?;

    let pipeline = IngestPipeline::new(fetcher, recognizer, store, &config.scraper.image_dir)
        .with_failure_policy(config.pipeline.failure_policy);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Ingesting {}", args.url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.run(&args.url).await;
    spinner.finish_and_clear();
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} menu image(s), {} item(s) parsed, {} stored in {}",
        style("✓").green(),
        report.images.len(),
        report.items.len(),
        report.stored,
        config.store.database_path.display()
    );
    for failure in &report.failures {
        println!("  {} {}: {}", style("✗").red(), failure.source, failure.error);
    }
    println!("Processing time: {}ms", report.processing_time_ms);

    Ok(())
}
