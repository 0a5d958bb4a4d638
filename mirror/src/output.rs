//! Console output for the mirror CLI.
//!
//! Progress lines go to stderr through [`write_stderr_line`]; this module
//! formats the stage messages and the dry-run plan.

use camino::Utf8Path;
use std::io::Write;

use crate::artefact::version::Version;
use crate::prune::{PruneReport, RetentionPolicy};
use crate::release::ReleaseConfig;

/// Write a line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Message reported after a successful verification.
#[must_use]
pub fn valid_message(path: &Utf8Path) -> String {
    format!("{path}: valid checksum")
}

/// Message reported after a mismatch removed an artefact.
#[must_use]
pub fn mismatch_message(path: &Utf8Path, expected: &str, actual: &str) -> String {
    format!("{path}: checksum mismatch (published {expected}, computed {actual}); file deleted")
}

/// One-line summary of a pruning pass.
///
/// # Examples
///
/// ```
/// use release_mirror::output::prune_summary;
/// use release_mirror::prune::PruneReport;
///
/// assert_eq!(prune_summary(&PruneReport::default()), "Nothing to prune.");
/// ```
#[must_use]
pub fn prune_summary(report: &PruneReport) -> String {
    if report.deleted.is_empty() && report.protected.is_empty() && report.failed.is_empty() {
        return "Nothing to prune.".to_owned();
    }
    let plural = if report.deleted.len() == 1 { "" } else { "s" };
    let mut summary = format!("Pruned {} old artefact{plural}", report.deleted.len());
    if !report.failed.is_empty() {
        summary.push_str(&format!(", {} could not be deleted", report.failed.len()));
    }
    if !report.protected.is_empty() {
        summary.push_str(&format!(
            ", {} kept for manual inspection",
            report.protected.len()
        ));
    }
    summary.push('.');
    summary
}

/// Plan shown by `--dry-run`.
#[derive(Debug)]
pub struct DryRunPlan<'a> {
    /// The resolved latest version.
    pub version: &'a Version,
    /// One release description per mirror directory.
    pub releases: &'a [ReleaseConfig],
    /// Retention policy that would be applied.
    pub policy: RetentionPolicy,
}

impl DryRunPlan<'_> {
    /// Format the plan for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Latest version: {}", self.version),
            format!("Retention: {}", describe_policy(self.policy)),
        ];

        for release in self.releases {
            let state = if release.target_file.exists() {
                "present"
            } else {
                "missing"
            };
            lines.push(String::new());
            lines.push(format!("Target: {} ({state})", release.target_file));
            lines.push(format!("  download: {}", release.download_url));
            lines.push(format!("  digest:   {}", release.digest_url));
        }

        lines.join("\n")
    }
}

fn describe_policy(policy: RetentionPolicy) -> String {
    match policy {
        RetentionPolicy::KeepLatest(keep) => format!("keep the {keep} newest artefacts"),
        RetentionPolicy::SingleSurvivor => "keep only the verified artefact".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MirrorConfig;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "hello");
        assert_eq!(buffer, b"hello\n");
    }

    #[test]
    fn valid_message_mentions_valid_checksum() {
        let msg = valid_message(Utf8Path::new("/srv/a.rpm"));
        assert!(msg.contains("valid checksum"));
    }

    #[rstest]
    #[case::single(1, 0, 0, "Pruned 1 old artefact.")]
    #[case::plural(2, 0, 0, "Pruned 2 old artefacts.")]
    #[case::with_failure(1, 1, 0, "Pruned 1 old artefact, 1 could not be deleted.")]
    #[case::with_protected(0, 0, 1, "Pruned 0 old artefacts, 1 kept for manual inspection.")]
    fn prune_summary_counts(
        #[case] deleted: usize,
        #[case] failed: usize,
        #[case] protected: usize,
        #[case] expected: &str,
    ) {
        let path = Utf8PathBuf::from("/srv/a.rpm");
        let report = PruneReport {
            deleted: vec![path.clone(); deleted],
            protected: vec![path.clone(); protected],
            failed: vec![(path, "denied".to_owned()); failed],
        };
        assert_eq!(prune_summary(&report), expected);
    }

    #[test]
    fn dry_run_plan_lists_each_target() {
        let version = Version::from_dotted("2.0.0").expect("valid version");
        let config = MirrorConfig::default();
        let releases = vec![
            ReleaseConfig::new(&config, &version, Utf8Path::new("/nonexistent/a")),
            ReleaseConfig::new(&config, &version, Utf8Path::new("/nonexistent/b")),
        ];
        let plan = DryRunPlan {
            version: &version,
            releases: &releases,
            policy: RetentionPolicy::KeepLatest(3),
        };

        let text = plan.display_text();

        assert!(text.contains("Dry run"));
        assert!(text.contains("Latest version: 2.0.0"));
        assert!(text.contains("/nonexistent/a/teleport-2.0.0-1.x86_64.rpm (missing)"));
        assert!(text.contains("/nonexistent/b/teleport-2.0.0-1.x86_64.rpm (missing)"));
        assert!(text.contains("keep the 3 newest"));
    }
}
