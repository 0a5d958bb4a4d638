//! Numeric release versions parsed from strict dotted tags.
//!
//! A [`Version`] is an ordered tuple of unsigned integers. Ordering is the
//! derived lexicographic order over the components, so `1.10.0` sorts after
//! `1.9.5` and a strict prefix (`1.2`) sorts before its extensions (`1.2.0`).

use super::error::{ArtefactError, Result};
use std::fmt;
use std::str::FromStr;

/// Prefix every eligible release tag carries.
const TAG_PREFIX: char = 'v';

/// A release version such as `1.2.3`.
///
/// # Examples
///
/// ```
/// use release_mirror::artefact::version::Version;
///
/// let older = Version::from_tag("v1.9.5").expect("valid tag");
/// let newer = Version::from_tag("v1.10.0").expect("valid tag");
/// assert!(newer > older);
/// assert_eq!(newer.to_string(), "1.10.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(Vec<u64>);

impl Version {
    /// Parse a release tag of the form `v<digits>(.<digits>)*`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidVersion`] when the tag lacks the `v`
    /// prefix or the remainder is not strictly numeric-dotted.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let Some(dotted) = tag.strip_prefix(TAG_PREFIX) else {
            return Err(ArtefactError::InvalidVersion {
                value: tag.to_owned(),
                reason: format!("tag must start with '{TAG_PREFIX}'"),
            });
        };
        Self::from_dotted(dotted).map_err(|_| ArtefactError::InvalidVersion {
            value: tag.to_owned(),
            reason: "expected v<digits>(.<digits>)*".to_owned(),
        })
    }

    /// Parse a bare dotted version such as `1.2.3`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidVersion`] when a segment is empty,
    /// contains anything other than ASCII digits, or overflows `u64`.
    pub fn from_dotted(value: &str) -> Result<Self> {
        let invalid = |reason: String| ArtefactError::InvalidVersion {
            value: value.to_owned(),
            reason,
        };

        value
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(invalid("empty version segment".to_owned()));
                }
                if let Some(bad) = segment.chars().find(|c| !c.is_ascii_digit()) {
                    return Err(invalid(format!("non-digit character '{bad}'")));
                }
                segment
                    .parse::<u64>()
                    .map_err(|e| invalid(format!("segment \"{segment}\": {e}")))
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Return the numeric components in order.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for Version {
    type Err = ArtefactError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_dotted(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components = self.0.iter();
        if let Some(first) = components.next() {
            write!(f, "{first}")?;
        }
        for component in components {
            write!(f, ".{component}")?;
        }
        Ok(())
    }
}
