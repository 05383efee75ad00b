//! Serve command - expose stored menu items over HTTP.

use std::path::PathBuf;

use clap::Args;
use console::style;

use menuscan_core::api::{self, ApiState};
use menuscan_core::MenuStore;

use super::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db) = args.db {
        config.store.database_path = db;
    }

    let store = MenuStore::open(&config.store.database_path, config.store.reingest)?;

    println!(
        "{} Serving {} on http://{}/menu_items",
        style("ℹ").blue(),
        config.store.database_path.display(),
        config.server.bind
    );
    println!("  Development server, errors are returned verbatim. Do not expose publicly.");

    api::serve(&config.server.bind, ApiState::new(store)).await?;
    Ok(())
}
