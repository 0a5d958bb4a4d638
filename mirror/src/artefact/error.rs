//! Error types for artefact versions, digests, and URL templates.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// A release tag or version string is not strictly numeric-dotted.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected tag or version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// A URL template is missing a required placeholder.
    #[error("invalid URL template \"{template}\": {reason}")]
    InvalidTemplate {
        /// The rejected template.
        template: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
