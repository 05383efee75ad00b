//! Subcommand implementations and the helpers they share.

pub mod config;
pub mod ingest;
pub mod list;
pub mod ocr;
pub mod serve;

use std::path::Path;

use menuscan_core::models::config::MenuscanConfig;
use menuscan_core::{
    MenuItem, MenuLineParser, MenuPreprocessor, MenuRecognizer, OnnxTextExtractor, ParsedItem,
};
use tracing::debug;

/// Output format for item listings.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

/// Load the config file given on the command line, else the default one,
/// else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<MenuscanConfig> {
    if let Some(path) = config_path {
        return Ok(MenuscanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(MenuscanConfig::from_file(&default_path)?)
    } else {
        Ok(MenuscanConfig::default())
    }
}

/// Build the OCR recognizer described by `config`.
pub fn build_recognizer(
    config: &MenuscanConfig,
) -> anyhow::Result<MenuRecognizer<MenuPreprocessor, OnnxTextExtractor>> {
    let extractor = OnnxTextExtractor::new(config.ocr.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;

    Ok(MenuRecognizer::new(MenuPreprocessor::new(), extractor)
        .with_parser(MenuLineParser::from_config(&config.parser)))
}

/// Render parsed (not yet stored) items.
pub fn format_parsed(items: &[ParsedItem], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["name", "price"])?;
            for item in items {
                wtr.write_record([&item.name, &item.price])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(items
            .iter()
            .map(|item| format!("{:<40} {:>8}", item.name, item.price))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render stored items.
pub fn format_stored(items: &[MenuItem], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let views: Vec<_> = items
                .iter()
                .cloned()
                .map(menuscan_core::MenuItemView::from)
                .collect();
            Ok(serde_json::to_string_pretty(&views)?)
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["id", "name", "price", "ingested_at"])?;
            for item in items {
                wtr.write_record([
                    &item.id.to_string(),
                    &item.name,
                    &item.price.to_string(),
                    &item.ingested_at,
                ])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(items
            .iter()
            .map(|item| {
                format!(
                    "{:>5}  {:<40} {:>8.2}  {}",
                    item.id, item.name, item.price, item.ingested_at
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
