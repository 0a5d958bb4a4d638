//! Release mirror library.
//!
//! This crate keeps a local copy of the latest release artefact of a
//! package. A run resolves the newest stable tag from a release index,
//! downloads the matching artefact into each mirror directory, verifies it
//! against the published SHA-256 digest, and prunes older copies. It is used
//! by the `release-mirror` CLI binary and can be driven programmatically with
//! any [`artefact::download::ReleaseClient`].
//!
//! # Modules
//!
//! - [`artefact`] - Versions, naming, digests, and remote access
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - TOML configuration and defaults
//! - [`error`] - Run-level error types
//! - [`fetch`] - Idempotent artefact download
//! - [`lock`] - Per-directory run lock
//! - [`output`] - Console messages and the dry-run plan
//! - [`pipeline`] - Run orchestration and reporting
//! - [`prompt`] - Operator digest fallback
//! - [`prune`] - Version-ordered retention pruning
//! - [`release`] - Per-run URL and path resolution
//! - [`resolution`] - Latest-version resolution from the release index
//! - [`verify`] - Checksum verification

pub mod artefact;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod lock;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod prune;
pub mod release;
pub mod resolution;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod verify;
