//! Run-scoped description of the artefact to mirror into one directory.

use camino::{Utf8Path, Utf8PathBuf};

use crate::artefact::naming::{ArtefactName, ArtefactPattern};
use crate::artefact::version::Version;
use crate::config::MirrorConfig;

/// Where to fetch the resolved artefact and its digest, and where to put it.
///
/// Built once per run for each configured mirror directory and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Artefact download URL.
    pub download_url: String,
    /// Published digest URL.
    pub digest_url: String,
    /// Destination of the artefact on disk.
    pub target_file: Utf8PathBuf,
}

impl ReleaseConfig {
    /// Resolve URLs and the target path for `version` in `target_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use release_mirror::artefact::version::Version;
    /// use release_mirror::config::MirrorConfig;
    /// use release_mirror::release::ReleaseConfig;
    ///
    /// let config = MirrorConfig::default();
    /// let version = Version::from_dotted("2.0.0").expect("valid version");
    /// let release = ReleaseConfig::new(&config, &version, Utf8Path::new("/srv/mirror"));
    ///
    /// assert_eq!(release.download_url, "https://cdn.teleport.dev/teleport-2.0.0-1.x86_64.rpm");
    /// assert_eq!(release.digest_url, "https://cdn.teleport.dev/teleport-2.0.0-1.x86_64.rpm.sha256");
    /// assert_eq!(release.target_file, "/srv/mirror/teleport-2.0.0-1.x86_64.rpm");
    /// ```
    #[must_use]
    pub fn new(config: &MirrorConfig, version: &Version, target_dir: &Utf8Path) -> Self {
        let name = ArtefactName::new(
            &config.package,
            version.clone(),
            &config.arch,
            &config.extension,
        );
        let filename = name.filename();
        let download_url = interpolate(&config.artefact_url_template, config, version, &filename);
        let digest_url = match &config.digest_url_template {
            Some(template) => interpolate(template, config, version, &filename),
            None => format!("{download_url}{}", config.digest_suffix),
        };
        Self {
            download_url,
            digest_url,
            target_file: target_dir.join(&filename),
        }
    }

    /// Directory holding the target file.
    #[must_use]
    pub fn target_dir(&self) -> &Utf8Path {
        self.target_file.parent().unwrap_or(Utf8Path::new("."))
    }
}

/// The pattern matching every cached artefact of the configured package.
#[must_use]
pub fn artefact_pattern(config: &MirrorConfig) -> ArtefactPattern {
    ArtefactPattern::new(&config.package, &config.extension)
}

/// Substitute the URL template placeholders.
fn interpolate(template: &str, config: &MirrorConfig, version: &Version, filename: &str) -> String {
    template
        .replace("{package}", &config.package)
        .replace("{version}", &version.to_string())
        .replace("{arch}", &config.arch)
        .replace("{ext}", &config.extension)
        .replace("{filename}", filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version() -> Version {
        Version::from_dotted("15.4.2").expect("valid version")
    }

    #[test]
    fn templates_expand_every_placeholder() {
        let config = MirrorConfig {
            artefact_url_template: "https://dl.example.test/{package}/{version}/{arch}.{ext}"
                .to_owned(),
            ..MirrorConfig::default()
        };
        let release = ReleaseConfig::new(&config, &version(), Utf8Path::new("/srv"));
        assert_eq!(
            release.download_url,
            "https://dl.example.test/teleport/15.4.2/x86_64.rpm"
        );
    }

    #[test]
    fn separate_digest_template_is_used_when_configured() {
        let config = MirrorConfig {
            digest_url_template: Some("https://sums.example.test/{filename}.sum".to_owned()),
            ..MirrorConfig::default()
        };
        let release = ReleaseConfig::new(&config, &version(), Utf8Path::new("/srv"));
        assert_eq!(
            release.digest_url,
            "https://sums.example.test/teleport-15.4.2-1.x86_64.rpm.sum"
        );
    }

    #[test]
    fn target_dir_is_parent_of_target_file() {
        let release = ReleaseConfig::new(
            &MirrorConfig::default(),
            &version(),
            Utf8Path::new("/srv/mirror"),
        );
        assert_eq!(release.target_dir(), Utf8Path::new("/srv/mirror"));
    }

    #[test]
    fn pattern_matches_generated_target() {
        let config = MirrorConfig::default();
        let release = ReleaseConfig::new(&config, &version(), Utf8Path::new("/srv"));
        let filename = release.target_file.file_name().expect("file name");
        assert_eq!(artefact_pattern(&config).version_of(filename), Some(version()));
    }
}
