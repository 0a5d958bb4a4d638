//! Retention pruning of cached artefacts.
//!
//! Cached copies are ordered by the [`Version`] embedded in their file names,
//! never by name or modification time. The file verified by the current run
//! is never deleted; if a policy selects it, the pruner leaves it in place and
//! asks for manual inspection instead. Failing to delete any other file is
//! logged and recorded but does not stop the pass.

use camino::{Utf8Path, Utf8PathBuf};

use crate::artefact::naming::ArtefactPattern;
use crate::artefact::version::Version;
use crate::config::{RetentionConfig, RetentionMode};
use crate::error::{MirrorError, Result};

/// Which cached artefacts survive a pruning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the given number of newest artefacts.
    KeepLatest(usize),
    /// Keep only the artefact verified by this run.
    SingleSurvivor,
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        match config.policy {
            RetentionMode::KeepLatest => Self::KeepLatest(config.keep),
            RetentionMode::SingleSurvivor => Self::SingleSurvivor,
        }
    }
}

/// What a pruning pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Files that were deleted.
    pub deleted: Vec<Utf8PathBuf>,
    /// Files selected for deletion but left in place because the current run
    /// verified them.
    pub protected: Vec<Utf8PathBuf>,
    /// Files that could not be deleted, with the reason.
    pub failed: Vec<(Utf8PathBuf, String)>,
}

/// A cached artefact found in the mirror directory.
#[derive(Debug)]
struct CachedArtefact {
    path: Utf8PathBuf,
    version: Option<Version>,
}

/// Prune `target_dir` according to `policy`.
///
/// `just_verified` names the artefact this run downloaded or confirmed, if
/// any; it is never deleted.
///
/// # Errors
///
/// Returns [`MirrorError::Filesystem`] if the directory cannot be listed.
pub fn prune(
    target_dir: &Utf8Path,
    pattern: &ArtefactPattern,
    policy: RetentionPolicy,
    just_verified: Option<&Utf8Path>,
) -> Result<PruneReport> {
    prune_with(target_dir, pattern, policy, just_verified, |path| {
        std::fs::remove_file(path)
    })
}

/// [`prune`] with an injectable file removal.
fn prune_with(
    target_dir: &Utf8Path,
    pattern: &ArtefactPattern,
    policy: RetentionPolicy,
    just_verified: Option<&Utf8Path>,
    mut remove: impl FnMut(&Utf8Path) -> std::io::Result<()>,
) -> Result<PruneReport> {
    let cached = list_cached(target_dir, pattern)?;
    let doomed = match policy {
        RetentionPolicy::KeepLatest(keep) => select_beyond_count(cached, keep),
        RetentionPolicy::SingleSurvivor => select_all_but(cached, just_verified),
    };

    let mut report = PruneReport::default();
    for path in doomed {
        if just_verified.is_some_and(|verified| verified == path.as_path()) {
            log::warn!("refusing to delete just-verified {path}; manual inspection required");
            report.protected.push(path);
            continue;
        }
        match remove(&path) {
            Ok(()) => {
                log::info!("pruned {path}");
                report.deleted.push(path);
            }
            Err(e) => {
                log::warn!("could not prune {path}: {e}");
                report.failed.push((path, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// List regular files in `dir` whose names match `pattern`.
fn list_cached(dir: &Utf8Path, pattern: &ArtefactPattern) -> Result<Vec<CachedArtefact>> {
    let entries = dir.read_dir_utf8().map_err(|source| MirrorError::Filesystem {
        operation: "read directory",
        path: dir.to_owned(),
        source,
    })?;

    let mut cached = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MirrorError::Filesystem {
            operation: "read directory",
            path: dir.to_owned(),
            source,
        })?;
        let name = entry.file_name();
        if !pattern.matches(name) || !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        cached.push(CachedArtefact {
            version: pattern.version_of(name),
            path: entry.into_path(),
        });
    }
    Ok(cached)
}

/// Everything beyond the `keep` newest versioned artefacts.
///
/// Artefacts whose version cannot be recovered from the name are never
/// selected.
fn select_beyond_count(cached: Vec<CachedArtefact>, keep: usize) -> Vec<Utf8PathBuf> {
    let (mut versioned, unversioned): (Vec<_>, Vec<_>) =
        cached.into_iter().partition(|c| c.version.is_some());
    for artefact in &unversioned {
        log::warn!("leaving {}: no version in file name", artefact.path);
    }

    if versioned.len() <= keep {
        return Vec::new();
    }
    // Newest first; the name breaks ties between equal versions.
    versioned.sort_by(|a, b| b.version.cmp(&a.version).then_with(|| a.path.cmp(&b.path)));
    versioned.into_iter().skip(keep).map(|c| c.path).collect()
}

/// Every cached artefact except `survivor`. Without a survivor nothing is
/// selected.
fn select_all_but(cached: Vec<CachedArtefact>, survivor: Option<&Utf8Path>) -> Vec<Utf8PathBuf> {
    let Some(survivor_name) = survivor.and_then(Utf8Path::file_name) else {
        log::warn!("no verified artefact this run; single-survivor pruning skipped");
        return Vec::new();
    };
    cached
        .into_iter()
        .filter(|c| c.path.file_name() != Some(survivor_name))
        .map(|c| c.path)
        .collect()
}

#[cfg(test)]
#[path = "prune_tests.rs"]
mod tests;
