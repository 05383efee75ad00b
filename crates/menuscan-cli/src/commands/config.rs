//! Config command - manage configuration.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use menuscan_core::models::config::MenuscanConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "scraper.marker")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show configuration file path
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init { force } => init_config(&path, force),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// `<config dir>/menuscan/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("menuscan")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<MenuscanConfig> {
    if path.exists() {
        Ok(MenuscanConfig::from_file(path)?)
    } else {
        Ok(MenuscanConfig::default())
    }
}

/// `scraper.marker` -> `/scraper/marker`
fn pointer(key: &str) -> String {
    key.split('.').fold(String::new(), |mut acc, part| {
        acc.push('/');
        acc.push_str(part);
        acc
    })
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }

    let config = load_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    MenuscanConfig::default().save(path)?;

    println!(
        "{} Created config file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let document = serde_json::to_value(load_or_default(path)?)?;

    match document.pointer(&pointer(key)) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => anyhow::bail!("Unknown config key: {}", key),
    }
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let mut document = serde_json::to_value(load_or_default(path)?)?;

    let slot = document
        .pointer_mut(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;
    *slot = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let config: MenuscanConfig = serde_json::from_value(document)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_key_becomes_json_pointer() {
        assert_eq!(pointer("scraper.marker"), "/scraper/marker");
        assert_eq!(pointer("server"), "/server");
    }
}
