//! Shared test utilities for the mirror crate.

use camino::Utf8PathBuf;
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::path::Path;
use tempfile::TempDir;

use crate::artefact::download::{DownloadError, ReleaseClient};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// A release index body listing one record per tag.
pub fn release_index_json(tags: &[&str]) -> String {
    let records: Vec<serde_json::Value> = tags
        .iter()
        .map(|tag| serde_json::json!({ "tag_name": tag, "draft": false }))
        .collect();
    serde_json::Value::Array(records).to_string()
}

/// A temporary directory together with its UTF-8 path.
///
/// # Panics
///
/// Panics if the directory cannot be created or its path is not UTF-8.
#[expect(
    clippy::expect_used,
    reason = "fixture directories are required for every test that uses them"
)]
pub fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 temp path");
    (temp, path)
}

/// How [`StubClient`] answers a digest request.
#[derive(Debug, Clone)]
pub enum DigestResponse {
    /// Respond with this body.
    Body(String),
    /// Respond with HTTP 404.
    NotFound,
    /// Fail with a transport error.
    Error(String),
}

/// A canned [`ReleaseClient`] that counts the requests it serves.
///
/// By default it publishes the correct digest of its artefact body.
#[derive(Debug)]
pub struct StubClient {
    index: String,
    artefact: Vec<u8>,
    digest: DigestResponse,
    download_failure: Option<String>,
    index_requests: Cell<usize>,
    downloads: Cell<usize>,
    digest_requests: Cell<usize>,
    urls: RefCell<Vec<String>>,
}

impl StubClient {
    /// A client serving `tags` in its index and `artefact` for every
    /// download.
    pub fn new(tags: &[&str], artefact: &[u8]) -> Self {
        Self {
            index: release_index_json(tags),
            artefact: artefact.to_vec(),
            digest: DigestResponse::Body(format!("{}  artefact\n", sha256_hex(artefact))),
            download_failure: None,
            index_requests: Cell::new(0),
            downloads: Cell::new(0),
            digest_requests: Cell::new(0),
            urls: RefCell::new(Vec::new()),
        }
    }

    /// Replace the digest response.
    #[must_use]
    pub fn with_digest(mut self, digest: DigestResponse) -> Self {
        self.digest = digest;
        self
    }

    /// Make every download fail with `reason`.
    #[must_use]
    pub fn with_download_failure(mut self, reason: &str) -> Self {
        self.download_failure = Some(reason.to_owned());
        self
    }

    /// Number of release index requests served.
    pub fn index_requests(&self) -> usize {
        self.index_requests.get()
    }

    /// Number of artefact downloads attempted.
    pub fn downloads(&self) -> usize {
        self.downloads.get()
    }

    /// Number of digest requests served.
    pub fn digest_requests(&self) -> usize {
        self.digest_requests.get()
    }

    /// Every URL requested, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }

    fn record(&self, counter: &Cell<usize>, url: &str) {
        counter.set(counter.get() + 1);
        self.urls.borrow_mut().push(url.to_owned());
    }
}

impl ReleaseClient for StubClient {
    fn fetch_release_index(&self, url: &str) -> Result<String, DownloadError> {
        self.record(&self.index_requests, url);
        Ok(self.index.clone())
    }

    fn download_artefact(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.record(&self.downloads, url);
        if let Some(reason) = &self.download_failure {
            return Err(DownloadError::HttpError {
                url: url.to_owned(),
                reason: reason.clone(),
            });
        }
        std::fs::write(dest, &self.artefact)?;
        Ok(())
    }

    fn fetch_digest(&self, url: &str) -> Result<String, DownloadError> {
        self.record(&self.digest_requests, url);
        match &self.digest {
            DigestResponse::Body(body) => Ok(body.clone()),
            DigestResponse::NotFound => Err(DownloadError::NotFound {
                url: url.to_owned(),
            }),
            DigestResponse::Error(reason) => Err(DownloadError::HttpError {
                url: url.to_owned(),
                reason: reason.clone(),
            }),
        }
    }
}
