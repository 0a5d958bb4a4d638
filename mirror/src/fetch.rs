//! Idempotent artefact download.
//!
//! The existence of the target file is the only freshness check. A missing
//! artefact is streamed into a hidden temporary file in the same directory
//! and renamed into place once complete, so a failed transfer never leaves a
//! truncated file under the canonical name.

use camino::Utf8Path;

use crate::artefact::download::ReleaseClient;
use crate::release::ReleaseConfig;

/// Prefix of in-flight temporary files. Never matches an artefact pattern.
const PARTIAL_PREFIX: &str = ".release-mirror-";

/// Suffix of in-flight temporary files.
const PARTIAL_SUFFIX: &str = ".part";

/// The outcome of [`ensure_downloaded`].
///
/// Like the verification outcome this is not a `Result`: the caller decides
/// whether a failure ends the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The target file existed; no request was made.
    AlreadyPresent,
    /// The artefact was downloaded to the target path.
    Downloaded,
    /// The transfer failed and no file was created at the target path.
    Failed {
        /// A human-readable explanation of the failure.
        reason: String,
    },
}

/// Make sure the artefact described by `release` exists on disk.
pub fn ensure_downloaded(client: &dyn ReleaseClient, release: &ReleaseConfig) -> DownloadOutcome {
    if release.target_file.exists() {
        log::debug!("{} already present", release.target_file);
        return DownloadOutcome::AlreadyPresent;
    }
    match download_via_temp(client, release) {
        Ok(()) => DownloadOutcome::Downloaded,
        Err(reason) => {
            log::warn!("download of {} failed: {reason}", release.download_url);
            DownloadOutcome::Failed { reason }
        }
    }
}

/// Download into a temporary sibling of the target, then rename it over.
fn download_via_temp(
    client: &dyn ReleaseClient,
    release: &ReleaseConfig,
) -> Result<(), String> {
    let dir = release.target_dir();
    std::fs::create_dir_all(dir).map_err(|e| format!("cannot create {dir}: {e}"))?;
    let temp_path = partial_file(dir)?;

    client
        .download_artefact(&release.download_url, &temp_path)
        .map_err(|e| e.to_string())?;

    temp_path
        .persist(&release.target_file)
        .map_err(|e| format!("cannot move download to {}: {}", release.target_file, e.error))?;
    log::info!("downloaded {}", release.target_file);
    Ok(())
}

/// Create an empty, self-deleting temporary file inside `dir`.
fn partial_file(dir: &Utf8Path) -> Result<tempfile::TempPath, String> {
    tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .suffix(PARTIAL_SUFFIX)
        .tempfile_in(dir)
        .map(tempfile::NamedTempFile::into_temp_path)
        .map_err(|e| format!("cannot create temporary file in {dir}: {e}"))
}
