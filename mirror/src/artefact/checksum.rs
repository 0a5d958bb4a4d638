//! Streaming SHA-256 computation for downloaded artefacts.

use super::sha256_digest::Sha256Digest;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Chunk size used when hashing files.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` in [`CHUNK_SIZE`] chunks so that large artefacts
/// are never held in memory, and returns the lowercase hex digest.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn compute_sha256(path: &Path) -> io::Result<Sha256Digest> {
    let file = fs::File::open(path)?;
    sha256_of_reader(file)
}

/// Compute the SHA-256 digest of everything `reader` yields.
///
/// # Errors
///
/// Returns an I/O error if reading fails.
pub fn sha256_of_reader(mut reader: impl Read) -> io::Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        if let Some(chunk) = buffer.get(..bytes_read) {
            hasher.update(chunk);
        }
    }
    let hex = format!("{:x}", hasher.finalize());
    Sha256Digest::try_from(hex).map_err(io::Error::other)
}
