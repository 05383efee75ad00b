//! Core library for restaurant menu scraping.
//!
//! This crate provides:
//! - Menu image discovery and download from a restaurant page
//! - OCR preprocessing and text extraction using PaddleOCR models
//! - Price line parsing into (name, price) pairs
//! - SQLite persistence and a read-only JSON query service

pub mod api;
pub mod error;
pub mod menu;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod scrape;
pub mod store;

pub use api::{build_router, ApiState};
pub use error::{FetchError, MenuscanError, OcrError, ParseError, Result, StoreError};
pub use menu::{MenuLineParser, MenuRecognizer};
pub use models::config::MenuscanConfig;
pub use models::menu_item::{MenuItem, MenuItemView, ParsedItem};
pub use ocr::{MenuPreprocessor, OnnxTextExtractor, Preprocessor, TextExtractor};
pub use pipeline::{FailurePolicy, ImageFailure, ImageIngest, IngestPipeline, IngestReport};
pub use scrape::{extract_image_urls, resolve_image_url, ImageFetcher};
pub use store::{MenuStore, ReingestPolicy};
