//! Menu image discovery and download.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use lazy_static::lazy_static;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::config::ScraperConfig;

lazy_static! {
    static ref IMG_SELECTOR: Selector = Selector::parse("img").unwrap();
}

/// Collect the `src` of every `<img>` whose source contains `marker`.
///
/// Sources are returned verbatim and in document order. Images without a
/// `src` attribute are ignored.
pub fn extract_image_urls(html: &str, marker: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| src.contains(marker))
        .map(str::to_string)
        .collect()
}

/// Resolve an image reference against the page it was found on.
pub fn resolve_image_url(page_url: &str, src: &str) -> Result<String, FetchError> {
    let base = Url::parse(page_url).map_err(|e| FetchError::InvalidUrl {
        url: page_url.to_string(),
        reason: e.to_string(),
    })?;

    base.join(src)
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl {
            url: src.to_string(),
            reason: e.to_string(),
        })
}

/// Path an image at `index` is stored under.
pub fn image_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.jpg", index))
}

/// HTTP side of the pipeline: page fetch and image download.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
    marker: String,
}

impl ImageFetcher {
    /// Create a fetcher from scraper configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| FetchError::Request {
                url: String::new(),
                source,
            })?;

        Ok(Self::with_client(client, config.marker.clone()))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, marker: impl Into<String>) -> Self {
        Self {
            client,
            marker: marker.into(),
        }
    }

    /// Marker token image sources are filtered on.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Fetch a page and list its menu image sources.
    pub async fn fetch_image_urls(&self, page_url: &str) -> Result<Vec<String>, FetchError> {
        let response = self.get(page_url).await?;
        let body = response.text().await.map_err(|source| FetchError::Request {
            url: page_url.to_string(),
            source,
        })?;

        let urls = extract_image_urls(&body, &self.marker);
        info!(
            "Found {} image(s) containing {:?} on {}",
            urls.len(),
            self.marker,
            page_url
        );

        Ok(urls)
    }

    /// Download every URL to `<dir>/<index>.jpg`, stopping at the first failure.
    ///
    /// `dir` is created up front, even for an empty URL list. A non-2xx
    /// response fails with [`FetchError::Status`] instead of writing the
    /// error body as an image, so K URLs yield K files only when every
    /// server answers with success.
    pub async fn download_images(
        &self,
        urls: &[String],
        dir: &Path,
    ) -> Result<Vec<PathBuf>, FetchError> {
        fs::create_dir_all(dir).map_err(|source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            let path = image_path(dir, index);
            self.download_image(url, &path).await?;
            paths.push(path);
        }

        Ok(paths)
    }

    /// Download a single URL and write the raw body to `path`.
    ///
    /// The parent directory is created if absent. The body goes to a
    /// `.part` file that is renamed on success and removed on failure.
    pub async fn download_image(&self, url: &str, path: &Path) -> Result<(), FetchError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let response = self.get(url).await?;

        let temp_path = path.with_extension("part");
        let written = match write_body(response, url, &temp_path).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        fs::rename(&temp_path, path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Downloaded {} ({} bytes) to {}", url, written, path.display());
        Ok(())
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Stream a response body into `path`, returning the number of bytes written.
async fn write_body(
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    let io_err = |source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(io_err)?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).map_err(io_err)?;
        written += chunk.len() as u64;
    }

    file.flush().map_err(io_err)?;
    Ok(written)
}
