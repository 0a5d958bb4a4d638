//! Artefact naming, versions, digests, and remote access.
//!
//! This module holds the type-safe domain model for a mirrored release
//! artefact:
//!
//! - [`checksum`] - Streaming SHA-256 computation.
//! - [`download`] - Remote read trait and HTTP implementation.
//! - [`error`] - Semantic error types for validation failures.
//! - [`naming`] - Artefact file naming (`ArtefactName`, `ArtefactPattern`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`version`] - Numeric release version (`Version`).

pub mod checksum;
pub mod download;
pub mod error;
pub mod naming;
pub mod sha256_digest;
pub mod version;
