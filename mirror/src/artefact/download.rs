//! HTTP access to the release index, artefacts, and published digests.
//!
//! Provides a trait-based abstraction over the three remote reads a mirror
//! run performs, enabling dependency injection for testing.

use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use super::sha256_digest::DIGEST_HEX_LEN;
use crate::config::NetworkConfig;

/// Number of bytes consulted from a digest response body.
pub const DIGEST_READ_LIMIT: u64 = DIGEST_HEX_LEN as u64;

/// Trait for the remote reads performed during a mirror run.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use release_mirror::artefact::download::HttpClient;
/// use release_mirror::config::NetworkConfig;
///
/// let client = HttpClient::new(&NetworkConfig::default());
/// // Use client.fetch_release_index(url) in production
/// # let _ = client;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseClient {
    /// Fetch the release index JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be read.
    fn fetch_release_index(&self, url: &str) -> Result<String, DownloadError>;

    /// Download the artefact at `url` into `dest`, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or file write fails.
    fn download_artefact(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;

    /// Fetch the leading [`DIGEST_READ_LIMIT`] bytes of a published digest,
    /// decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NotFound`] when no digest is published, or
    /// another variant when the request fails or the bytes are not UTF-8.
    fn fetch_digest(&self, url: &str) -> Result<String, DownloadError>;
}

/// Errors arising from remote read operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] io::Error),
}

/// HTTP-based client using `ureq`.
///
/// Connect and response-head timeouts apply to every request. The body limit
/// is set per request: small documents get the read timeout, artefacts get
/// the longer download timeout.
pub struct HttpClient {
    agent: ureq::Agent,
    read_timeout: Duration,
    download_timeout: Duration,
}

impl HttpClient {
    /// Build a client whose agent applies the configured timeouts.
    #[must_use]
    pub fn new(network: &NetworkConfig) -> Self {
        let read_timeout = Duration::from_secs(network.read_timeout_secs);
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(network.connect_timeout_secs)))
            .timeout_recv_response(Some(read_timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            read_timeout,
            download_timeout: Duration::from_secs(network.download_timeout_secs),
        }
    }

    fn get(
        &self,
        url: &str,
        body_timeout: Duration,
    ) -> Result<ureq::http::Response<ureq::Body>, DownloadError> {
        log::debug!("GET {url}");
        self.agent
            .get(url)
            .config()
            .timeout_recv_body(Some(body_timeout))
            .build()
            .call()
            .map_err(|e| map_ureq_error(url, &e))
    }
}

impl ReleaseClient for HttpClient {
    fn fetch_release_index(&self, url: &str) -> Result<String, DownloadError> {
        self.get(url, self.read_timeout)?
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_artefact(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let response = self.get(url, self.download_timeout)?;
        let mut file = std::fs::File::create(dest)?;
        let written = io::copy(&mut response.into_body().into_reader(), &mut file)?;
        file.sync_all()?;
        log::debug!("wrote {written} bytes from {url}");
        Ok(())
    }

    fn fetch_digest(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.get(url, self.read_timeout)?;
        read_digest_prefix(response.into_body().into_reader()).map_err(|e| {
            DownloadError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            }
        })
    }
}

/// Read at most [`DIGEST_READ_LIMIT`] bytes from `reader` and decode them.
///
/// The rest of the body is never consumed, so an oversized or endless
/// response cannot grow memory or stall the run.
///
/// # Errors
///
/// Returns an I/O error if reading fails or the bytes are not valid UTF-8.
pub fn read_digest_prefix(reader: impl Read) -> io::Result<String> {
    let mut prefix = Vec::with_capacity(DIGEST_HEX_LEN);
    reader.take(DIGEST_READ_LIMIT).read_to_end(&mut prefix)?;
    String::from_utf8(prefix).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
