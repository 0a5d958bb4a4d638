//! Mirror run orchestrator.
//!
//! Resolves the latest version once, then for every configured mirror
//! directory: lock → download → verify → prune. Fatal failures propagate as
//! [`MirrorError`]; a checksum mismatch is recorded in the [`RunReport`] and
//! the run carries on with pruning. The binary maps the outcome to an exit
//! code with [`RunReport::exit_code`].

use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

use crate::artefact::download::ReleaseClient;
use crate::artefact::naming::ArtefactPattern;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::version::Version;
use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::fetch::{DownloadOutcome, ensure_downloaded};
use crate::lock::RunLock;
use crate::output::{DryRunPlan, mismatch_message, prune_summary, valid_message, write_stderr_line};
use crate::prompt::DigestPrompt;
use crate::prune::{PruneReport, RetentionPolicy, prune};
use crate::release::{ReleaseConfig, artefact_pattern};
use crate::resolution::resolve_latest_version;
use crate::verify::{VerifyOutcome, verify, verify_against};

/// Exit code when every directory holds a current, verified artefact.
pub const EXIT_OK: i32 = 0;

/// Exit code for a fatal error.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a completed run that deleted a mismatched artefact.
pub const EXIT_CHECKSUM_MISMATCH: i32 = 2;

/// What happened to the artefact in one mirror directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    /// The artefact was already cached; nothing was fetched or verified.
    AlreadyPresent,
    /// The artefact was downloaded and its digest matched.
    Verified,
    /// The downloaded artefact did not match and was deleted.
    ChecksumMismatch {
        /// The published or operator-supplied digest.
        expected: Sha256Digest,
        /// The digest of the deleted file.
        actual: Sha256Digest,
    },
}

/// Result of mirroring into one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationReport {
    /// The canonical artefact path in this directory.
    pub target_file: Utf8PathBuf,
    /// Download and verification outcome.
    pub outcome: LocationOutcome,
    /// What retention pruning did.
    pub prune: PruneReport,
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The version that was mirrored.
    pub version: Version,
    /// One entry per mirror directory, in configuration order.
    pub locations: Vec<LocationReport>,
}

impl RunReport {
    /// Whether any directory ended with a deleted, mismatched artefact.
    #[must_use]
    pub fn has_checksum_mismatch(&self) -> bool {
        self.locations
            .iter()
            .any(|location| matches!(location.outcome, LocationOutcome::ChecksumMismatch { .. }))
    }

    /// Process exit code for this completed run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.has_checksum_mismatch() {
            EXIT_CHECKSUM_MISMATCH
        } else {
            EXIT_OK
        }
    }
}

/// Shared inputs for a run.
pub struct MirrorRun<'a> {
    /// The validated configuration.
    pub config: &'a MirrorConfig,
    /// Transport for index, artefact, and digest requests.
    pub client: &'a dyn ReleaseClient,
    /// When true, suppress progress output.
    pub quiet: bool,
}

impl MirrorRun<'_> {
    /// Mirror the latest release into every configured directory.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`MirrorError`]; directories after the failing
    /// one are not touched.
    pub fn run(
        &self,
        prompt: &mut dyn DigestPrompt,
        stderr: &mut dyn Write,
    ) -> Result<RunReport> {
        let version = resolve_latest_version(self.client, &self.config.release_index_url)?;
        self.say(stderr, format!("Latest {} release: {version}", self.config.package));

        let pattern = artefact_pattern(self.config);
        let policy = RetentionPolicy::from(&self.config.retention);
        let mut locations = Vec::with_capacity(self.config.target_dirs.len());
        for dir in &self.config.target_dirs {
            let release = ReleaseConfig::new(self.config, &version, dir);
            locations.push(self.mirror_location(&release, &pattern, policy, prompt, stderr)?);
        }
        Ok(RunReport { version, locations })
    }

    /// Resolve the latest version and write the plan to `stdout` without
    /// touching any mirror directory.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, or [`MirrorError::WriteFailed`] if the plan
    /// cannot be written.
    pub fn dry_run(&self, stdout: &mut dyn Write) -> Result<Version> {
        let version = resolve_latest_version(self.client, &self.config.release_index_url)?;
        let releases: Vec<ReleaseConfig> = self
            .config
            .target_dirs
            .iter()
            .map(|dir| ReleaseConfig::new(self.config, &version, dir))
            .collect();
        let plan = DryRunPlan {
            version: &version,
            releases: &releases,
            policy: RetentionPolicy::from(&self.config.retention),
        };
        writeln!(stdout, "{}", plan.display_text())
            .map_err(|source| MirrorError::WriteFailed { source })?;
        Ok(version)
    }

    fn mirror_location(
        &self,
        release: &ReleaseConfig,
        pattern: &ArtefactPattern,
        policy: RetentionPolicy,
        prompt: &mut dyn DigestPrompt,
        stderr: &mut dyn Write,
    ) -> Result<LocationReport> {
        let dir = release.target_dir();
        let lock = RunLock::acquire(dir)?;
        log::debug!("holding {}", lock.path());

        let target = release.target_file.as_path();
        let outcome = match ensure_downloaded(self.client, release) {
            DownloadOutcome::AlreadyPresent => {
                self.say(stderr, format!("{target}: already present"));
                LocationOutcome::AlreadyPresent
            }
            DownloadOutcome::Downloaded => {
                self.say(stderr, format!("Downloaded {target}"));
                self.verify_download(release, prompt, stderr)?
            }
            DownloadOutcome::Failed { reason } => {
                return Err(MirrorError::DownloadFailed {
                    url: release.download_url.clone(),
                    reason,
                });
            }
        };

        // A cached file may have been left unverified by an earlier run, so it
        // cannot be the single survivor.
        let just_verified = match (&outcome, policy) {
            (LocationOutcome::Verified, _)
            | (LocationOutcome::AlreadyPresent, RetentionPolicy::KeepLatest(_)) => Some(target),
            (LocationOutcome::AlreadyPresent, RetentionPolicy::SingleSurvivor)
            | (LocationOutcome::ChecksumMismatch { .. }, _) => None,
        };
        let pruned = prune(dir, pattern, policy, just_verified)?;
        self.say(stderr, format!("{dir}: {}", prune_summary(&pruned)));

        Ok(LocationReport {
            target_file: release.target_file.clone(),
            outcome,
            prune: pruned,
        })
    }

    fn verify_download(
        &self,
        release: &ReleaseConfig,
        prompt: &mut dyn DigestPrompt,
        stderr: &mut dyn Write,
    ) -> Result<LocationOutcome> {
        let target = release.target_file.as_path();
        let outcome = match verify(self.client, release)? {
            VerifyOutcome::SourceUnavailable => {
                let Some(supplied) = prompt.request_digest(target.as_str(), &release.digest_url)
                else {
                    return Err(MirrorError::DigestUnavailable {
                        url: release.digest_url.clone(),
                        path: target.to_owned(),
                    });
                };
                let expected = Sha256Digest::from_published(&supplied).map_err(|source| {
                    MirrorError::InvalidDigest {
                        path: target.to_owned(),
                        source,
                    }
                })?;
                verify_against(target, &expected)?
            }
            published => published,
        };
        self.report_verification(target, outcome, &release.digest_url, stderr)
    }

    fn report_verification(
        &self,
        target: &Utf8Path,
        outcome: VerifyOutcome,
        digest_url: &str,
        stderr: &mut dyn Write,
    ) -> Result<LocationOutcome> {
        match outcome {
            VerifyOutcome::Valid => {
                self.say(stderr, valid_message(target));
                Ok(LocationOutcome::Verified)
            }
            VerifyOutcome::Invalid { expected, actual } => {
                self.say(
                    stderr,
                    mismatch_message(target, expected.as_str(), actual.as_str()),
                );
                Ok(LocationOutcome::ChecksumMismatch { expected, actual })
            }
            VerifyOutcome::SourceUnavailable => Err(MirrorError::DigestUnavailable {
                url: digest_url.to_owned(),
                path: target.to_owned(),
            }),
        }
    }

    fn say(&self, stderr: &mut dyn Write, message: impl std::fmt::Display) {
        if !self.quiet {
            write_stderr_line(stderr, message);
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
