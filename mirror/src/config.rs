//! Mirror configuration loaded from TOML.
//!
//! Values come from, in increasing priority: built-in defaults, the
//! configuration file, and command-line overrides. The file is read from
//! `--config` when given, otherwise from the platform configuration
//! directory when present. Every table uses `deny_unknown_fields` so that a
//! misspelt key fails loudly instead of silently falling back to a default.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::artefact::error::ArtefactError;
use crate::error::{MirrorError, Result};

/// Application name used for platform directories.
const APP_NAME: &str = "release-mirror";

/// File name of the configuration file inside the configuration directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration for a mirror run.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Package name used in artefact file names.
    pub package: String,
    /// JSON endpoint listing releases with a `tag_name` field.
    pub release_index_url: String,
    /// Template for the artefact download URL.
    pub artefact_url_template: String,
    /// Template for the digest URL. When unset the artefact URL is suffixed
    /// with [`Self::digest_suffix`].
    pub digest_url_template: Option<String>,
    /// Suffix appended to the artefact URL to locate its digest.
    pub digest_suffix: String,
    /// Architecture component of artefact names.
    pub arch: String,
    /// File extension of artefacts, without the leading dot.
    pub extension: String,
    /// Mirror directories, each receiving its own copy of the artefact.
    pub target_dirs: Vec<Utf8PathBuf>,
    /// Retention settings applied after verification.
    pub retention: RetentionConfig,
    /// Network timeouts.
    pub network: NetworkConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            package: "teleport".to_owned(),
            release_index_url: "https://api.github.com/repos/gravitational/teleport/releases"
                .to_owned(),
            artefact_url_template: "https://cdn.teleport.dev/{filename}".to_owned(),
            digest_url_template: None,
            digest_suffix: ".sha256".to_owned(),
            arch: "x86_64".to_owned(),
            extension: "rpm".to_owned(),
            target_dirs: default_target_dir().into_iter().collect(),
            retention: RetentionConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

/// Which retention policy the pruner applies.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionMode {
    /// Keep the `keep` newest artefacts.
    #[default]
    KeepLatest,
    /// Keep only the artefact verified by this run.
    SingleSurvivor,
}

/// Retention settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionConfig {
    /// Policy selector.
    pub policy: RetentionMode,
    /// Number of artefacts kept under [`RetentionMode::KeepLatest`].
    #[serde(default = "RetentionConfig::default_keep")]
    pub keep: usize,
}

impl RetentionConfig {
    const fn default_keep() -> usize {
        3
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            policy: RetentionMode::default(),
            keep: Self::default_keep(),
        }
    }
}

/// Network timeouts, in seconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Connection establishment timeout.
    pub connect_timeout_secs: u64,
    /// Time allowed for a response head, and for the whole body of the
    /// release index and digest responses.
    pub read_timeout_secs: u64,
    /// Time allowed for receiving the whole artefact body.
    pub download_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            download_timeout_secs: 3600,
        }
    }
}

impl MirrorConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] when the document is not valid TOML or
    /// contains unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use release_mirror::config::MirrorConfig;
    ///
    /// let config = MirrorConfig::from_toml_str("package = \"tctl\"").expect("valid config");
    /// assert_eq!(config.package, "tctl");
    /// assert_eq!(config.retention.keep, 3);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| MirrorError::Config {
            reason: e.to_string(),
        })
    }

    /// Load configuration from `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] if the file cannot be read or parsed.
    pub fn load_from(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MirrorError::Config {
            reason: format!("cannot read {path}: {e}"),
        })?;
        Self::from_toml_str(&contents).map_err(|e| MirrorError::Config {
            reason: format!("{path}: {e}"),
        })
    }

    /// Load configuration from an explicit path or the default location.
    ///
    /// An explicit path must exist. The default location is optional; when
    /// no file is present there, built-in defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] if a file is found but cannot be read
    /// or parsed.
    pub fn load(explicit: Option<&Utf8Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading configuration from {path}");
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Check the cross-field invariants the run relies on.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("package", &self.package),
            ("arch", &self.arch),
            ("extension", &self.extension),
        ] {
            if value.trim().is_empty() {
                return Err(MirrorError::Config {
                    reason: format!("{field} must not be empty"),
                });
            }
        }
        validate_template(&self.artefact_url_template)?;
        if let Some(template) = &self.digest_url_template {
            validate_template(template)?;
        }
        if self.target_dirs.is_empty() {
            return Err(MirrorError::Config {
                reason: "at least one target directory is required".to_owned(),
            });
        }
        if self.retention.keep == 0 {
            return Err(MirrorError::Config {
                reason: "retention.keep must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Require that a URL template identifies the version it downloads.
fn validate_template(template: &str) -> Result<()> {
    if template.contains("{version}") || template.contains("{filename}") {
        return Ok(());
    }
    let err = ArtefactError::InvalidTemplate {
        template: template.to_owned(),
        reason: "must contain {version} or {filename}".to_owned(),
    };
    Err(MirrorError::Config {
        reason: err.to_string(),
    })
}

/// Default configuration file path for the current platform.
#[must_use]
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let dirs = directories_next::ProjectDirs::from("", "", APP_NAME)?;
    let path = dirs.config_dir().join(CONFIG_FILE_NAME);
    Utf8PathBuf::from_path_buf(path).ok()
}

/// Default mirror directory for the current platform.
#[must_use]
pub fn default_target_dir() -> Option<Utf8PathBuf> {
    let dirs = directories_next::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(dirs.cache_dir().join("artefacts")).ok()
}
