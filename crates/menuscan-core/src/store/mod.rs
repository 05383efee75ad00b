//! SQLite persistence for menu items.
//!
//! Every operation opens its own connection and drops it before returning.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::menu_item::{MenuItem, ParsedItem};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS menu_items (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        price       REAL NOT NULL,
        ingested_at TEXT NOT NULL
    );
";

const INSERT_APPEND: &str =
    "INSERT INTO menu_items (name, price, ingested_at) VALUES (?1, ?2, ?3)";

const INSERT_SKIP_EXISTING: &str = "
    INSERT INTO menu_items (name, price, ingested_at)
    SELECT ?1, ?2, ?3
    WHERE NOT EXISTS (SELECT 1 FROM menu_items WHERE name = ?1 AND price = ?2)
";

/// How a batch treats items that are already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReingestPolicy {
    /// Insert every item, duplicates included.
    #[default]
    Append,
    /// Skip items whose (name, price) is already stored.
    SkipExisting,
}

/// Handle to the menu item database.
#[derive(Debug, Clone)]
pub struct MenuStore {
    path: PathBuf,
    policy: ReingestPolicy,
}

impl MenuStore {
    /// Open (and create if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>, policy: ReingestPolicy) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self { path, policy };
        store.connect()?.execute_batch(SCHEMA)?;
        debug!("Opened menu store at {}", store.path.display());

        Ok(store)
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-ingestion policy in use.
    pub fn policy(&self) -> ReingestPolicy {
        self.policy
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(conn)
    }

    /// Store a batch of parsed items in one transaction.
    ///
    /// All prices are coerced before anything is written, so a bad price
    /// leaves the table untouched. Returns the number of rows inserted.
    pub fn persist(&self, items: &[ParsedItem]) -> Result<usize, StoreError> {
        let rows = items
            .iter()
            .map(|item| -> Result<(&str, f64), StoreError> {
                Ok((item.name.as_str(), item.price_value()?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ingested_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let sql = match self.policy {
            ReingestPolicy::Append => INSERT_APPEND,
            ReingestPolicy::SkipExisting => INSERT_SKIP_EXISTING,
        };

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for (name, price) in &rows {
                inserted += stmt.execute(params![name, price, ingested_at])?;
            }
        }
        tx.commit()?;

        info!(
            "Stored {} of {} item(s) in {}",
            inserted,
            rows.len(),
            self.path.display()
        );
        Ok(inserted)
    }

    /// Every stored row, in table scan order.
    pub fn list_all(&self) -> Result<Vec<MenuItem>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name, price, ingested_at FROM menu_items")?;
        let items = stmt
            .query_map([], |row| {
                Ok(MenuItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    ingested_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Number of stored rows.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM menu_items", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
