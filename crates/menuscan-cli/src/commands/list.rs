//! List command - print stored menu items.

use std::path::PathBuf;

use clap::Args;

use menuscan_core::MenuStore;

use super::{format_stored, load_config, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(db) = args.db {
        config.store.database_path = db;
    }

    let store = MenuStore::open(&config.store.database_path, config.store.reingest)?;
    let items = store.list_all()?;

    println!("{}", format_stored(&items, args.format)?);
    Ok(())
}
