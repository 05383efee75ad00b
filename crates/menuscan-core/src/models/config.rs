//! Configuration structures for the ingestion pipeline and query service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::FailurePolicy;
use crate::store::ReingestPolicy;

/// Main configuration for menuscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuscanConfig {
    /// Page scraping and image download configuration.
    pub scraper: ScraperConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Price line parser configuration.
    pub parser: ParserConfig,

    /// Store configuration.
    pub store: StoreConfig,

    /// Query service configuration.
    pub server: ServerConfig,

    /// Ingestion run configuration.
    pub pipeline: PipelineConfig,
}

/// Page scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Substring an image `src` must contain to be treated as a menu image.
    pub marker: String,

    /// Directory downloaded images are written to.
    pub image_dir: PathBuf,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            marker: "menu".to_string(),
            image_dir: PathBuf::from("data/images"),
            user_agent: concat!("menuscan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,

    /// Two boxes share a line when their vertical centers differ by less
    /// than this fraction of the median box height.
    pub line_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
            line_tolerance: 0.5,
        }
    }
}

impl OcrConfig {
    /// Full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Price line parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Accept `12.50` / `12,50` as a single price instead of stopping at `12`.
    pub decimal_prices: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            decimal_prices: true,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// What to do with rows that are already stored.
    pub reingest: ReingestPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/menu_items.db"),
            reingest: ReingestPolicy::Append,
        }
    }
}

/// Query service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Ingestion run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Whether a failed image aborts the run or is skipped.
    pub failure_policy: FailurePolicy,
}

impl MenuscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hardcoded_paths() {
        let config = MenuscanConfig::default();
        assert_eq!(config.scraper.marker, "menu");
        assert_eq!(config.scraper.image_dir, PathBuf::from("data/images"));
        assert_eq!(config.store.database_path, PathBuf::from("data/menu_items.db"));
        assert_eq!(config.store.reingest, ReingestPolicy::Append);
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: MenuscanConfig =
            serde_json::from_str(r#"{"store": {"reingest": "skip_existing"}}"#).unwrap();
        assert_eq!(config.store.reingest, ReingestPolicy::SkipExisting);
        assert_eq!(config.store.database_path, PathBuf::from("data/menu_items.db"));
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = MenuscanConfig::default();
        config.scraper.marker = "carte".to_string();
        config.pipeline.failure_policy = FailurePolicy::Skip;
        config.save(&path).unwrap();

        let loaded = MenuscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.scraper.marker, "carte");
        assert_eq!(loaded.pipeline.failure_policy, FailurePolicy::Skip);
    }
}
