//! Error types for the menuscan-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the menuscan library.
#[derive(Error, Debug)]
pub enum MenuscanError {
    /// Page or image fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A downloaded file could not be decoded as an image.
    #[error("decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Price coercion error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while fetching pages and downloading images.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request itself failed (connect, TLS, body read).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A page or image reference is not a usable URL.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Writing a downloaded image to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors raised when a parsed value cannot be coerced.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The price string of an item is not a number.
    #[error("invalid price {value:?} for item {name:?}: {source}")]
    InvalidPrice {
        name: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Errors related to the menu item store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A row of the batch carried a non-numeric price.
    #[error(transparent)]
    Price(#[from] ParseError),

    /// Failed to prepare the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the menuscan library.
pub type Result<T> = std::result::Result<T, MenuscanError>;
