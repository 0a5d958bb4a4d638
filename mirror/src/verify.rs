//! Checksum verification of a downloaded artefact.
//!
//! The published digest is the source of truth. An artefact that does not
//! match it is deleted straight away, and so is one whose digest could not be
//! fetched for any reason other than "not published", because an unverified
//! file must never stay in the mirror.

use camino::Utf8Path;

use crate::artefact::checksum::compute_sha256;
use crate::artefact::download::{DownloadError, ReleaseClient};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::error::{MirrorError, Result};
use crate::release::ReleaseConfig;

/// The outcome of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The local digest matches; the file is kept.
    Valid,
    /// The digests differ; the file has been deleted.
    Invalid {
        /// The published digest.
        expected: Sha256Digest,
        /// The digest of the deleted file.
        actual: Sha256Digest,
    },
    /// No digest is published for this artefact; the file is kept.
    SourceUnavailable,
}

/// Verify the artefact described by `release` against its published digest.
///
/// # Errors
///
/// Returns [`MirrorError::DigestTransport`] or [`MirrorError::InvalidDigest`]
/// after deleting the artefact when the digest cannot be fetched or is
/// malformed, and [`MirrorError::Filesystem`] when the artefact cannot be
/// hashed or deleted.
pub fn verify(client: &dyn ReleaseClient, release: &ReleaseConfig) -> Result<VerifyOutcome> {
    let path = release.target_file.as_path();
    let published = match client.fetch_digest(&release.digest_url) {
        Ok(text) => text,
        Err(DownloadError::NotFound { url }) => {
            log::warn!("no digest published at {url}");
            return Ok(VerifyOutcome::SourceUnavailable);
        }
        Err(source) => {
            remove_artefact(path)?;
            return Err(MirrorError::DigestTransport {
                path: path.to_owned(),
                source,
            });
        }
    };

    let expected = match Sha256Digest::from_published(&published) {
        Ok(digest) => digest,
        Err(source) => {
            remove_artefact(path)?;
            return Err(MirrorError::InvalidDigest {
                path: path.to_owned(),
                source,
            });
        }
    };

    verify_against(path, &expected)
}

/// Compare the artefact at `path` with `expected`, deleting it on mismatch.
///
/// # Errors
///
/// Returns [`MirrorError::Filesystem`] if the file cannot be read, or if it
/// does not match and cannot be deleted.
pub fn verify_against(path: &Utf8Path, expected: &Sha256Digest) -> Result<VerifyOutcome> {
    let actual = compute_sha256(path.as_std_path()).map_err(|source| MirrorError::Filesystem {
        operation: "hash",
        path: path.to_owned(),
        source,
    })?;

    if actual == *expected {
        log::info!("{path}: checksum {actual} verified");
        return Ok(VerifyOutcome::Valid);
    }

    log::warn!("{path}: checksum mismatch, expected {expected}, got {actual}");
    remove_artefact(path)?;
    Ok(VerifyOutcome::Invalid {
        expected: expected.clone(),
        actual,
    })
}

/// Delete the primary artefact. Failure here is fatal for the run.
fn remove_artefact(path: &Utf8Path) -> Result<()> {
    std::fs::remove_file(path).map_err(|source| MirrorError::Filesystem {
        operation: "remove",
        path: path.to_owned(),
        source,
    })?;
    log::info!("removed {path}");
    Ok(())
}
