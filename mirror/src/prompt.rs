//! Operator fallback for artefacts without a published digest.
//!
//! Unattended runs never prompt: a missing digest ends the run for that
//! directory. Interactive runs ask on stdin for a digest to check against.

use std::io::{BufRead, Write};

/// Source of an operator-supplied digest.
pub trait DigestPrompt {
    /// Ask for the digest of the artefact at `artefact`, whose published
    /// digest was expected at `digest_url`.
    ///
    /// Returns `None` when no digest is available from the operator.
    fn request_digest(&mut self, artefact: &str, digest_url: &str) -> Option<String>;
}

/// Prompt used by scheduled runs; never supplies a digest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl DigestPrompt for Unattended {
    fn request_digest(&mut self, _artefact: &str, _digest_url: &str) -> Option<String> {
        None
    }
}

/// Prompt that reads one line from `input` after writing a question to
/// `output`.
#[derive(Debug)]
pub struct InteractivePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    /// Create a prompt over the given streams.
    #[must_use]
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> DigestPrompt for InteractivePrompt<R, W> {
    fn request_digest(&mut self, artefact: &str, digest_url: &str) -> Option<String> {
        let asked = write!(
            self.output,
            "No digest published at {digest_url}.\nEnter the SHA-256 of {artefact} (blank to abort): "
        )
        .and_then(|()| self.output.flush());
        if let Err(e) = asked {
            log::warn!("could not write digest prompt: {e}");
            return None;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Err(e) => {
                log::warn!("could not read digest from operator: {e}");
                None
            }
        }
    }
}
