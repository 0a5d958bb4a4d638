//! Artefact naming policy for mirrored release files.
//!
//! Constructs deterministic file names in the format
//! `<package>-<version>-1.<arch>.<ext>` and recognises cached files that
//! belong to the same package when pruning.

use super::version::Version;
use std::fmt;

/// Package release number embedded in every artefact name.
const PACKAGE_RELEASE: &str = "1";

/// A fully-qualified artefact file name.
///
/// # Examples
///
/// ```
/// use release_mirror::artefact::naming::ArtefactName;
/// use release_mirror::artefact::version::Version;
///
/// let version = Version::from_dotted("15.4.2").expect("valid version");
/// let name = ArtefactName::new("teleport", version, "x86_64", "rpm");
/// assert_eq!(name.to_string(), "teleport-15.4.2-1.x86_64.rpm");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactName {
    package: String,
    version: Version,
    arch: String,
    extension: String,
}

impl ArtefactName {
    /// Create an artefact name from its components.
    #[must_use]
    pub fn new(package: &str, version: Version, arch: &str, extension: &str) -> Self {
        Self {
            package: package.to_owned(),
            version,
            arch: arch.to_owned(),
            extension: extension.to_owned(),
        }
    }

    /// Return the file name as a `String`.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtefactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{PACKAGE_RELEASE}.{}.{}",
            self.package, self.version, self.arch, self.extension
        )
    }
}

/// Matches cached files of the form `<package>-*.<ext>`.
///
/// The pattern is deliberately wider than [`ArtefactName`]: any file with the
/// package prefix and extension counts as a cached copy, and the version is
/// recovered from the name when one can be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactPattern {
    prefix: String,
    suffix: String,
}

impl ArtefactPattern {
    /// Create a pattern for the given package and file extension.
    #[must_use]
    pub fn new(package: &str, extension: &str) -> Self {
        Self {
            prefix: format!("{package}-"),
            suffix: format!(".{extension}"),
        }
    }

    /// Return true when `filename` belongs to this package.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        self.middle(filename).is_some()
    }

    /// Recover the version embedded in a matching file name.
    ///
    /// Returns `None` when the name does not match or the text between the
    /// package prefix and the next `-` is not a dotted numeric version.
    ///
    /// # Examples
    ///
    /// ```
    /// use release_mirror::artefact::naming::ArtefactPattern;
    ///
    /// let pattern = ArtefactPattern::new("teleport", "rpm");
    /// let version = pattern.version_of("teleport-10.1.0-1.x86_64.rpm");
    /// assert_eq!(version.map(|v| v.to_string()), Some("10.1.0".to_owned()));
    /// assert!(pattern.version_of("teleport-latest.rpm").is_none());
    /// ```
    #[must_use]
    pub fn version_of(&self, filename: &str) -> Option<Version> {
        let middle = self.middle(filename)?;
        let version_text = middle.split_once('-').map_or(middle, |(head, _)| head);
        Version::from_dotted(version_text).ok()
    }

    /// The text between prefix and suffix, if both are present.
    fn middle<'a>(&self, filename: &'a str) -> Option<&'a str> {
        let rest = filename.strip_prefix(&self.prefix)?;
        let middle = rest.strip_suffix(&self.suffix)?;
        (!middle.is_empty()).then_some(middle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pattern() -> ArtefactPattern {
        ArtefactPattern::new("teleport", "rpm")
    }

    #[test]
    fn filename_embeds_all_components() {
        let version = Version::from_dotted("2.0.0").expect("valid version");
        let name = ArtefactName::new("teleport", version, "aarch64", "rpm");
        assert_eq!(name.filename(), "teleport-2.0.0-1.aarch64.rpm");
    }

    #[rstest]
    #[case::own_artefact("teleport-2.0.0-1.x86_64.rpm", true)]
    #[case::other_arch("teleport-2.0.0-1.arm.rpm", true)]
    #[case::other_package("tctl-2.0.0-1.x86_64.rpm", false)]
    #[case::other_extension("teleport-2.0.0-1.x86_64.deb", false)]
    #[case::digest_file("teleport-2.0.0-1.x86_64.rpm.sha256", false)]
    #[case::hidden_partial(".release-mirror-teleport-2.0.0-1.x86_64.rpm.part", false)]
    #[case::bare_prefix_and_suffix("teleport-.rpm", false)]
    fn pattern_matches_package_files(#[case] filename: &str, #[case] expected: bool) {
        assert_eq!(pattern().matches(filename), expected);
    }

    #[test]
    fn version_of_round_trips_generated_name() {
        let version = Version::from_dotted("16.0.12").expect("valid version");
        let name = ArtefactName::new("teleport", version.clone(), "x86_64", "rpm");
        assert_eq!(pattern().version_of(&name.filename()), Some(version));
    }

    #[test]
    fn version_of_rejects_unparseable_middle() {
        assert!(pattern().version_of("teleport-ent-2.0.0-1.x86_64.rpm").is_none());
    }
}
