//! Unit tests for retention pruning.

use super::*;
use crate::test_utils::utf8_temp_dir;
use rstest::{fixture, rstest};

struct Mirror {
    _temp: tempfile::TempDir,
    dir: Utf8PathBuf,
}

impl Mirror {
    fn seed(&self, names: &[&str]) {
        for name in names {
            std::fs::write(self.dir.join(name), name.as_bytes()).expect("seed file");
        }
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        self.dir.join(name)
    }

    fn remaining(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dir
            .read_dir_utf8()
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_owned())
            .collect();
        names.sort();
        names
    }
}

#[fixture]
fn mirror() -> Mirror {
    let (temp, dir) = utf8_temp_dir();
    Mirror { _temp: temp, dir }
}

fn pattern() -> ArtefactPattern {
    ArtefactPattern::new("teleport", "rpm")
}

const FIVE_VERSIONS: [&str; 5] = [
    "teleport-8.0.0-1.x86_64.rpm",
    "teleport-9.1.0-1.x86_64.rpm",
    "teleport-10.0.0-1.x86_64.rpm",
    "teleport-10.2.0-1.x86_64.rpm",
    "teleport-11.0.0-1.x86_64.rpm",
];

#[rstest]
fn keep_latest_removes_oldest_by_version_not_name(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);
    let newest = mirror.path("teleport-11.0.0-1.x86_64.rpm");

    let report = prune(
        &mirror.dir,
        &pattern(),
        RetentionPolicy::KeepLatest(3),
        Some(newest.as_path()),
    )
    .expect("prune");

    let mut deleted = report.deleted.clone();
    deleted.sort();
    assert_eq!(
        deleted,
        vec![
            mirror.path("teleport-8.0.0-1.x86_64.rpm"),
            mirror.path("teleport-9.1.0-1.x86_64.rpm"),
        ]
    );
    assert!(report.protected.is_empty());
    assert_eq!(
        mirror.remaining(),
        vec![
            "teleport-10.0.0-1.x86_64.rpm".to_owned(),
            "teleport-10.2.0-1.x86_64.rpm".to_owned(),
            "teleport-11.0.0-1.x86_64.rpm".to_owned(),
        ]
    );
}

#[rstest]
#[case::below(2)]
#[case::equal(3)]
fn keep_latest_is_noop_at_or_below_count(mirror: Mirror, #[case] count: usize) {
    let seeded = FIVE_VERSIONS.get(..count).expect("enough names");
    mirror.seed(seeded);

    let report = prune(&mirror.dir, &pattern(), RetentionPolicy::KeepLatest(3), None)
        .expect("prune");

    assert_eq!(report, PruneReport::default());
    assert_eq!(mirror.remaining().len(), count);
}

#[rstest]
fn just_verified_file_is_never_deleted(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);
    let verified = mirror.path("teleport-8.0.0-1.x86_64.rpm");

    let report = prune(
        &mirror.dir,
        &pattern(),
        RetentionPolicy::KeepLatest(3),
        Some(verified.as_path()),
    )
    .expect("prune");

    assert_eq!(report.protected, vec![verified.clone()]);
    assert_eq!(
        report.deleted,
        vec![mirror.path("teleport-9.1.0-1.x86_64.rpm")]
    );
    assert!(verified.is_file());
}

#[rstest]
fn unrelated_and_unversioned_files_are_left_alone(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);
    mirror.seed(&[
        "teleport-latest.rpm",
        "teleport-8.0.0-1.x86_64.rpm.sha256",
        "tctl-1.0.0-1.x86_64.rpm",
        "notes.txt",
    ]);

    let report = prune(&mirror.dir, &pattern(), RetentionPolicy::KeepLatest(1), None)
        .expect("prune");

    assert_eq!(report.deleted.len(), 4);
    assert_eq!(
        mirror.remaining(),
        vec![
            "notes.txt".to_owned(),
            "tctl-1.0.0-1.x86_64.rpm".to_owned(),
            "teleport-11.0.0-1.x86_64.rpm".to_owned(),
            "teleport-8.0.0-1.x86_64.rpm.sha256".to_owned(),
            "teleport-latest.rpm".to_owned(),
        ]
    );
}

#[rstest]
fn matching_directories_are_ignored(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);
    std::fs::create_dir(mirror.path("teleport-1.0.0-1.x86_64.rpm")).expect("create dir");

    let report = prune(&mirror.dir, &pattern(), RetentionPolicy::KeepLatest(5), None)
        .expect("prune");

    assert!(report.deleted.is_empty());
    assert!(report.failed.is_empty());
}

#[rstest]
fn single_survivor_keeps_only_verified_file(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);
    mirror.seed(&["teleport-latest.rpm", "notes.txt"]);
    let verified = mirror.path("teleport-10.0.0-1.x86_64.rpm");

    let report = prune(
        &mirror.dir,
        &pattern(),
        RetentionPolicy::SingleSurvivor,
        Some(verified.as_path()),
    )
    .expect("prune");

    assert_eq!(report.deleted.len(), 5);
    assert_eq!(
        mirror.remaining(),
        vec![
            "notes.txt".to_owned(),
            "teleport-10.0.0-1.x86_64.rpm".to_owned(),
        ]
    );
}

#[rstest]
fn single_survivor_without_verified_file_deletes_nothing(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);

    let report =
        prune(&mirror.dir, &pattern(), RetentionPolicy::SingleSurvivor, None).expect("prune");

    assert!(report.deleted.is_empty());
    assert_eq!(mirror.remaining().len(), 5);
}

#[rstest]
fn missing_directory_is_filesystem_error(mirror: Mirror) {
    let missing = mirror.path("absent");

    let err = prune(&missing, &pattern(), RetentionPolicy::KeepLatest(3), None)
        .expect_err("missing directory");

    assert!(matches!(err, MirrorError::Filesystem { .. }));
}

#[rstest]
#[case::keep_latest(RetentionMode::KeepLatest, 5, RetentionPolicy::KeepLatest(5))]
#[case::single(RetentionMode::SingleSurvivor, 5, RetentionPolicy::SingleSurvivor)]
fn policy_from_config(
    #[case] mode: RetentionMode,
    #[case] keep: usize,
    #[case] expected: RetentionPolicy,
) {
    let config = RetentionConfig { policy: mode, keep };
    assert_eq!(RetentionPolicy::from(&config), expected);
}

#[rstest]
fn failed_delete_is_recorded_and_pruning_continues(mirror: Mirror) {
    mirror.seed(&FIVE_VERSIONS);
    let stuck = mirror.path("teleport-8.0.0-1.x86_64.rpm");
    let newest = mirror.path("teleport-11.0.0-1.x86_64.rpm");

    let report = prune_with(
        &mirror.dir,
        &pattern(),
        RetentionPolicy::KeepLatest(3),
        Some(newest.as_path()),
        |path| {
            if path == stuck.as_path() {
                Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only mount",
                ))
            } else {
                std::fs::remove_file(path)
            }
        },
    )
    .expect("a failed delete is not fatal");

    assert_eq!(report.deleted, vec![mirror.path("teleport-9.1.0-1.x86_64.rpm")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, stuck);
    assert!(report.failed[0].1.contains("read-only mount"));
    assert!(stuck.is_file());
    assert_eq!(mirror.remaining().len(), 4);
}
