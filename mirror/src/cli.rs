//! CLI argument definitions for the release mirror.
//!
//! Flags override values loaded from the configuration file; see
//! [`Cli::apply_to`].

use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;

use crate::config::{MirrorConfig, RetentionMode};

/// Keep a local mirror of the latest verified release artefact.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "release-mirror")]
#[command(version, about)]
#[command(long_about = concat!(
    "Keep a local mirror of the latest verified release artefact.\n\n",
    "Each run resolves the newest stable tag from the release index, downloads ",
    "the matching package into every mirror directory unless it is already ",
    "there, checks it against the published SHA-256 digest, and prunes older ",
    "copies.\n\n",
    "The run is meant to be scheduled. It exits 0 when the mirror is current, ",
    "2 when a download failed verification and was deleted, and 1 on any other ",
    "failure.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Mirror into the default cache directory:\n",
    "    $ release-mirror\n\n",
    "  Mirror into two directories, keeping five versions:\n",
    "    $ release-mirror -t /srv/mirror -t /mnt/backup --keep 5\n\n",
    "  Show what would be fetched:\n",
    "    $ release-mirror --dry-run\n\n",
    "  Verify by hand when no digest is published:\n",
    "    $ release-mirror --interactive",
))]
pub struct Cli {
    /// Configuration file [default: platform config directory].
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Mirror directory (can be repeated; replaces the configured list).
    #[arg(short, long = "target-dir", value_name = "DIR")]
    pub target_dirs: Vec<Utf8PathBuf>,

    /// Number of newest artefacts to keep.
    #[arg(long, value_name = "N", conflicts_with = "single_survivor")]
    pub keep: Option<usize>,

    /// Keep only the artefact verified by this run.
    #[arg(long)]
    pub single_survivor: bool,

    /// Prompt for a digest when none is published.
    #[arg(long)]
    pub interactive: bool,

    /// Resolve the latest version and print the plan without changing files.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Override `config` with any values given on the command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use release_mirror::cli::Cli;
    /// use release_mirror::config::MirrorConfig;
    ///
    /// let cli = Cli::parse_from(["release-mirror", "--keep", "5"]);
    /// let mut config = MirrorConfig::default();
    /// cli.apply_to(&mut config);
    /// assert_eq!(config.retention.keep, 5);
    /// ```
    pub fn apply_to(&self, config: &mut MirrorConfig) {
        if !self.target_dirs.is_empty() {
            config.target_dirs.clone_from(&self.target_dirs);
        }
        if let Some(keep) = self.keep {
            config.retention.policy = RetentionMode::KeepLatest;
            config.retention.keep = keep;
        }
        if self.single_survivor {
            config.retention.policy = RetentionMode::SingleSurvivor;
        }
    }

    /// Log filter implied by `-v` and `-q`.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
