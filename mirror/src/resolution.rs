//! Latest-version resolution from a release index.
//!
//! The index is a JSON array of release records. Only tags of the strict
//! form `v<digits>(.<digits>)*` are eligible; pre-releases and anything
//! suffixed are skipped without comment. The greatest [`Version`] wins.

use serde::Deserialize;

use crate::artefact::download::ReleaseClient;
use crate::artefact::version::Version;
use crate::error::{MirrorError, Result};

/// A single release record. Fields other than `tag_name` are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// The release tag, for example `v15.4.2`.
    #[serde(default)]
    pub tag_name: Option<String>,
}

/// Fetch the release index and return the latest eligible version.
///
/// # Errors
///
/// Returns [`MirrorError::Transport`] if the index cannot be fetched,
/// [`MirrorError::IndexParse`] if it is not a JSON array of objects, and
/// [`MirrorError::NoValidTags`] if no tag is eligible.
pub fn resolve_latest_version(client: &dyn ReleaseClient, url: &str) -> Result<Version> {
    let body = client
        .fetch_release_index(url)
        .map_err(MirrorError::Transport)?;
    let records = parse_release_index(url, &body)?;
    let version = latest_version(records.iter().filter_map(|r| r.tag_name.as_deref()))
        .ok_or_else(|| MirrorError::NoValidTags {
            url: url.to_owned(),
        })?;
    log::info!("resolved latest version {version} from {} records", records.len());
    Ok(version)
}

/// Parse the release index body.
///
/// # Errors
///
/// Returns [`MirrorError::IndexParse`] if the body is not a JSON array of
/// release objects.
pub fn parse_release_index(url: &str, body: &str) -> Result<Vec<ReleaseRecord>> {
    serde_json::from_str(body).map_err(|e| MirrorError::IndexParse {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Return the greatest version among the eligible `tags`.
///
/// # Examples
///
/// ```
/// use release_mirror::resolution::latest_version;
///
/// let latest = latest_version(["v1.2.0", "v1.10.0", "v1.9.5", "vbeta"]);
/// assert_eq!(latest.map(|v| v.to_string()), Some("1.10.0".to_owned()));
/// ```
pub fn latest_version<'a>(tags: impl IntoIterator<Item = &'a str>) -> Option<Version> {
    tags.into_iter()
        .filter_map(|tag| match Version::from_tag(tag) {
            Ok(version) => Some(version),
            Err(e) => {
                log::trace!("skipping tag: {e}");
                None
            }
        })
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::download::{DownloadError, MockReleaseClient};
    use crate::test_utils::release_index_json;
    use rstest::rstest;

    const INDEX_URL: &str = "https://example.test/releases";

    #[rstest]
    #[case::numeric_not_lexical(&["v1.2.0", "v1.10.0", "v1.9.5", "vbeta"], Some("1.10.0"))]
    #[case::prerelease_excluded(&["v2.0.0-rc.1", "v1.0.0"], Some("1.0.0"))]
    #[case::longer_tuple_wins_on_tie(&["v1.2", "v1.2.1"], Some("1.2.1"))]
    #[case::missing_prefix_excluded(&["3.0.0", "v2.0.0"], Some("2.0.0"))]
    #[case::none_eligible(&["vbeta", "nightly"], None)]
    #[case::empty(&[], None)]
    fn selects_greatest_eligible_tag(#[case] tags: &[&str], #[case] expected: Option<&str>) {
        let latest = latest_version(tags.iter().copied());
        assert_eq!(latest.map(|v| v.to_string()).as_deref(), expected);
    }

    #[test]
    fn resolves_from_index_body() {
        let mut client = MockReleaseClient::new();
        let body = release_index_json(&["v14.3.3", "v15.0.0", "v15.0.0-beta.2"]);
        client
            .expect_fetch_release_index()
            .times(1)
            .returning(move |_| Ok(body.clone()));

        let version = resolve_latest_version(&client, INDEX_URL).expect("resolved");
        assert_eq!(version.to_string(), "15.0.0");
    }

    #[test]
    fn records_without_tag_name_are_skipped() {
        let records =
            parse_release_index(INDEX_URL, r#"[{"name": "draft"}, {"tag_name": "v1.0.0"}]"#)
                .expect("valid index");
        assert_eq!(records.len(), 2);
        let latest = latest_version(records.iter().filter_map(|r| r.tag_name.as_deref()));
        assert_eq!(latest.map(|v| v.to_string()).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn no_eligible_tags_is_resolution_error() {
        let mut client = MockReleaseClient::new();
        let body = release_index_json(&["vbeta"]);
        client
            .expect_fetch_release_index()
            .returning(move |_| Ok(body.clone()));

        let err = resolve_latest_version(&client, INDEX_URL).expect_err("no tags");
        assert!(matches!(err, MirrorError::NoValidTags { .. }));
    }

    #[test]
    fn malformed_index_is_parse_error() {
        let mut client = MockReleaseClient::new();
        client
            .expect_fetch_release_index()
            .returning(|_| Ok("{\"message\": \"rate limited\"}".to_owned()));

        let err = resolve_latest_version(&client, INDEX_URL).expect_err("not an array");
        assert!(matches!(err, MirrorError::IndexParse { .. }));
    }

    #[test]
    fn transport_failure_is_propagated() {
        let mut client = MockReleaseClient::new();
        client.expect_fetch_release_index().returning(|url| {
            Err(DownloadError::HttpError {
                url: url.to_owned(),
                reason: "dns failure".to_owned(),
            })
        });

        let err = resolve_latest_version(&client, INDEX_URL).expect_err("transport");
        assert!(matches!(err, MirrorError::Transport(_)));
    }
}
