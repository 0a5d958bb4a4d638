//! Error types for a mirror run.
//!
//! Each variant names the stage that failed and carries enough context to
//! tell an operator what to look at. Whether a variant ends the process is
//! decided by the binary, never here.

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The release index contained no tag matching `v<digits>(.<digits>)*`.
    #[error("no valid version tags found at {url}")]
    NoValidTags {
        /// The release index URL.
        url: String,
    },

    /// The release index body was not the expected JSON array.
    #[error("could not parse release index from {url}: {reason}")]
    IndexParse {
        /// The release index URL.
        url: String,
        /// Description of the parse error.
        reason: String,
    },

    /// Fetching the release index failed.
    #[error("release index request failed: {0}")]
    Transport(#[source] DownloadError),

    /// The artefact transfer failed; no file was left at the target path.
    #[error("download of {url} failed: {reason}")]
    DownloadFailed {
        /// The artefact URL.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// Fetching the published digest failed; the artefact was deleted.
    #[error("digest request failed, removed unverified {path}")]
    DigestTransport {
        /// The artefact that was removed.
        path: Utf8PathBuf,
        /// The underlying transport error.
        #[source]
        source: DownloadError,
    },

    /// No digest is published and none was supplied; the artefact was kept.
    #[error("no digest published at {url}; verify {path} manually or rerun with --interactive")]
    DigestUnavailable {
        /// The digest URL that returned not found.
        url: String,
        /// The unverified artefact.
        path: Utf8PathBuf,
    },

    /// A published or operator-supplied digest was malformed.
    #[error("invalid digest for {path}: {source}")]
    InvalidDigest {
        /// The artefact the digest was meant for.
        path: Utf8PathBuf,
        /// The validation failure.
        #[source]
        source: ArtefactError,
    },

    /// A filesystem operation on a primary path failed.
    #[error("{operation} {path} failed")]
    Filesystem {
        /// What was being attempted (for example "remove" or "read directory").
        operation: &'static str,
        /// The path involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Another run holds the lock on the mirror directory.
    #[error("another run holds the lock {path}")]
    Locked {
        /// The lock file path.
        path: Utf8PathBuf,
    },

    /// Failed to write console output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`MirrorError`].
pub type Result<T> = std::result::Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_valid_tags_names_index_url() {
        let err = MirrorError::NoValidTags {
            url: "https://example.test/releases".to_owned(),
        };
        assert!(err.to_string().contains("https://example.test/releases"));
    }

    #[test]
    fn digest_unavailable_suggests_interactive_mode() {
        let err = MirrorError::DigestUnavailable {
            url: "https://example.test/a.rpm.sha256".to_owned(),
            path: Utf8PathBuf::from("/srv/mirror/a.rpm"),
        };
        let msg = err.to_string();
        assert!(msg.contains("--interactive"));
        assert!(msg.contains("/srv/mirror/a.rpm"));
    }

    #[test]
    fn digest_transport_preserves_source() {
        let err = MirrorError::DigestTransport {
            path: Utf8PathBuf::from("/srv/mirror/a.rpm"),
            source: DownloadError::HttpError {
                url: "https://example.test/a.rpm.sha256".to_owned(),
                reason: "connection reset".to_owned(),
            },
        };
        assert!(err.to_string().contains("removed unverified"));
        let source = std::error::Error::source(&err).expect("source present");
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn filesystem_error_names_operation_and_path() {
        let err = MirrorError::Filesystem {
            operation: "remove",
            path: Utf8PathBuf::from("/srv/mirror/a.rpm"),
            source: std::io::Error::other("permission denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("remove"));
        assert!(msg.contains("/srv/mirror/a.rpm"));
    }
}
