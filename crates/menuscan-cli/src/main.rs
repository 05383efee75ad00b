//! CLI application for restaurant menu scraping and OCR.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, ingest, list, ocr, serve};

/// Restaurant menu OCR - scrape menu images and turn them into priced items
#[derive(Parser)]
#[command(name = "menuscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a restaurant page, OCR its menu images and store the items
    Ingest(ingest::IngestArgs),

    /// Run OCR on local menu images
    Ocr(ocr::OcrArgs),

    /// Print stored menu items
    List(list::ListArgs),

    /// Serve stored menu items over HTTP
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Ingest(args) => ingest::run(args, config_path).await,
        Commands::Ocr(args) => ocr::run(args, config_path),
        Commands::List(args) => list::run(args, config_path),
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path),
    }
}
