//! Ingestion run: fetch, preprocess, extract, parse, store.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MenuscanError, Result};
use crate::menu::MenuRecognizer;
use crate::models::menu_item::ParsedItem;
use crate::ocr::{Preprocessor, TextExtractor};
use crate::scrape::{image_path, resolve_image_url, ImageFetcher};
use crate::store::MenuStore;

/// What a failed image does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failure fails the whole run; nothing is stored.
    #[default]
    Abort,
    /// Log the failure, record it in the report and carry on.
    Skip,
}

/// An image that was skipped under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, Serialize)]
pub struct ImageFailure {
    /// Image URL or file path.
    pub source: String,
    /// Error message.
    pub error: String,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Page the images were discovered on (empty for local runs).
    pub page_url: String,
    /// Image sources found on the page.
    pub image_urls: Vec<String>,
    /// Images that were downloaded or read.
    pub images: Vec<PathBuf>,
    /// Items parsed across all images.
    pub items: Vec<ParsedItem>,
    /// Rows inserted into the store.
    pub stored: usize,
    /// Skipped images.
    pub failures: Vec<ImageFailure>,
    /// Wall-clock duration in milliseconds.
    pub processing_time_ms: u64,
}

/// Recognizes image files already on disk and stores their items.
pub struct ImageIngest<P, E> {
    recognizer: MenuRecognizer<P, E>,
    store: MenuStore,
    failure_policy: FailurePolicy,
}

impl<P: Preprocessor, E: TextExtractor> ImageIngest<P, E> {
    /// Create an ingest that aborts on the first failure.
    pub fn new(recognizer: MenuRecognizer<P, E>, store: MenuStore) -> Self {
        Self {
            recognizer,
            store,
            failure_policy: FailurePolicy::Abort,
        }
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Failure policy in use.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Store the items are written to.
    pub fn store(&self) -> &MenuStore {
        &self.store
    }

    /// Recognize and store the given image files.
    pub fn ingest_images(&self, paths: &[PathBuf]) -> Result<IngestReport> {
        let report = IngestReport {
            images: paths.to_vec(),
            ..Default::default()
        };
        self.finish(report, Instant::now())
    }

    fn finish(&self, mut report: IngestReport, start: Instant) -> Result<IngestReport> {
        let mut items = Vec::new();
        let mut recognized = Vec::with_capacity(report.images.len());

        for path in &report.images {
            match self.recognizer.recognize_file(path) {
                Ok(found) => {
                    items.extend(found);
                    recognized.push(path.clone());
                }
                Err(e) => {
                    let source = path.display().to_string();
                    self.skip_or_abort(&mut report.failures, &source, e)?;
                }
            }
        }

        report.stored = self.store.persist(&items)?;
        report.images = recognized;
        report.items = items;
        report.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Ingestion complete: {} image(s), {} item(s), {} stored, {} skipped in {}ms",
            report.images.len(),
            report.items.len(),
            report.stored,
            report.failures.len(),
            report.processing_time_ms
        );

        Ok(report)
    }

    fn skip_or_abort(
        &self,
        failures: &mut Vec<ImageFailure>,
        source: &str,
        error: MenuscanError,
    ) -> Result<()> {
        match self.failure_policy {
            FailurePolicy::Abort => Err(error),
            FailurePolicy::Skip => {
                warn!("Skipping {}: {}", source, error);
                failures.push(ImageFailure {
                    source: source.to_string(),
                    error: error.to_string(),
                });
                Ok(())
            }
        }
    }
}

/// Runs the full pipeline against one page.
pub struct IngestPipeline<P, E> {
    fetcher: ImageFetcher,
    images: ImageIngest<P, E>,
    image_dir: PathBuf,
}

impl<P: Preprocessor, E: TextExtractor> IngestPipeline<P, E> {
    /// Create a pipeline that aborts on the first failure.
    pub fn new(
        fetcher: ImageFetcher,
        recognizer: MenuRecognizer<P, E>,
        store: MenuStore,
        image_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            images: ImageIngest::new(recognizer, store),
            image_dir: image_dir.into(),
        }
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.images = self.images.with_failure_policy(policy);
        self
    }

    /// Directory downloaded images are written to.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Scrape `page_url`, recognize every menu image and store the items.
    pub async fn run(&self, page_url: &str) -> Result<IngestReport> {
        let start = Instant::now();
        info!("Starting ingestion run for {}", page_url);

        let sources = self.fetcher.fetch_image_urls(page_url).await?;
        let mut report = IngestReport {
            page_url: page_url.to_string(),
            image_urls: sources.clone(),
            ..Default::default()
        };

        report.images = match self.images.failure_policy {
            FailurePolicy::Abort => {
                let urls = sources
                    .iter()
                    .map(|src| resolve_image_url(page_url, src))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                self.fetcher.download_images(&urls, &self.image_dir).await?
            }
            FailurePolicy::Skip => {
                let mut images = Vec::with_capacity(sources.len());
                for (index, src) in sources.iter().enumerate() {
                    let path = image_path(&self.image_dir, index);
                    let downloaded = match resolve_image_url(page_url, src) {
                        Ok(url) => self.fetcher.download_image(&url, &path).await,
                        Err(e) => Err(e),
                    };
                    match downloaded {
                        Ok(()) => images.push(path),
                        Err(e) => self.images.skip_or_abort(&mut report.failures, src, e.into())?,
                    }
                }
                images
            }
        };

        self.images.finish(report, start)
    }
}
