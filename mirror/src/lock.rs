//! Exclusive per-directory run lock.
//!
//! Overlapping scheduled runs would otherwise race on downloading,
//! verifying, and pruning the same files. The lock is an advisory `flock`
//! style lock on a hidden file inside the mirror directory and is released
//! when the [`RunLock`] is dropped.

use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use std::fs::{File, OpenOptions};

use crate::error::{MirrorError, Result};

/// Name of the lock file inside each mirror directory.
pub const LOCK_FILE_NAME: &str = ".release-mirror.lock";

/// A held lock on a mirror directory.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
    path: Utf8PathBuf,
}

impl RunLock {
    /// Create `dir` if needed and take its lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Locked`] if another process holds the lock and
    /// [`MirrorError::Filesystem`] if the directory or lock file cannot be
    /// created.
    pub fn acquire(dir: &Utf8Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| MirrorError::Filesystem {
            operation: "create directory",
            path: dir.to_owned(),
            source,
        })?;

        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| MirrorError::Filesystem {
                operation: "open lock file",
                path: path.clone(),
                source,
            })?;

        if let Err(e) = file.try_lock_exclusive() {
            log::debug!("lock {path} is busy: {e}");
            return Err(MirrorError::Locked { path });
        }
        log::debug!("acquired {path}");
        Ok(Self { _file: file, path })
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
