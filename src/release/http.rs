//! HTTP-backed release catalog.

use serde::Deserialize;
use tracing::debug;

use super::archive::parse_archive;
use super::model::{EditorRelease, Releases};
use super::source::ReleaseSource;
use super::version::{compare_versions, is_prerelease};
use crate::error::{InstallerError, Result};

/// Published release listing.
pub const DEFAULT_RELEASES_ENDPOINT: &str = "https://public-cdn.cloud.unity3d.com/hub/prod/";

/// Archive of generally available releases.
pub const DEFAULT_ARCHIVE_ENDPOINT: &str = "https://download.unity3d.com/download_unity/";

/// Archive of alpha and beta releases.
pub const DEFAULT_TESTING_ARCHIVE_ENDPOINT: &str = "http://beta.unity3d.com/download/";

#[derive(Debug, Default, Deserialize)]
struct PublishedReleases {
    #[serde(default)]
    official: Vec<EditorRelease>,
    #[serde(default)]
    beta: Vec<EditorRelease>,
}

/// Join two URL fragments with exactly one `/` between them.
pub fn join_slash(a: &str, b: &str) -> String {
    match (a.ends_with('/'), b.starts_with('/')) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// Fetches releases from the published listing and the release archives.
pub struct HttpReleaseSource {
    client: reqwest::blocking::Client,
    releases_endpoint: String,
    archive_endpoint: String,
    testing_archive_endpoint: String,
}

impl HttpReleaseSource {
    pub fn new(
        releases_endpoint: impl Into<String>,
        archive_endpoint: impl Into<String>,
        testing_archive_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            releases_endpoint: releases_endpoint.into(),
            archive_endpoint: archive_endpoint.into(),
            testing_archive_endpoint: testing_archive_endpoint.into(),
        }
    }

    fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        let catalog_error = |message: String| InstallerError::Catalog { message };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| catalog_error(format!("failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(catalog_error(format!(
                "bad status {} fetching {}: {}",
                status.as_u16(),
                url,
                body.trim()
            )));
        }

        response
            .text()
            .map_err(|e| catalog_error(format!("failed to read response from {}: {}", url, e)))
    }

    fn fetch_published(&self, platform: &str) -> Result<PublishedReleases> {
        let url = join_slash(&self.releases_endpoint, &format!("releases-{}.json", platform));
        let body = self.get_text(&url)?;
        serde_json::from_str(&body).map_err(|e| InstallerError::Catalog {
            message: format!("invalid release listing {}: {}", url, e),
        })
    }

    fn fetch_archived(
        &self,
        platform: &str,
        version: &str,
        revision: &str,
    ) -> Result<EditorRelease> {
        let base = if is_prerelease(version) {
            &self.testing_archive_endpoint
        } else {
            &self.archive_endpoint
        };
        let suffix = if platform == "win32" { "win" } else { platform };

        let url = join_slash(
            base,
            &format!("{}/unity-{}-{}.ini", revision, version, suffix),
        );
        let content = self.get_text(&url)?;
        parse_archive(&content, &url, platform, version)
    }
}

impl Default for HttpReleaseSource {
    fn default() -> Self {
        Self::new(
            DEFAULT_RELEASES_ENDPOINT,
            DEFAULT_ARCHIVE_ENDPOINT,
            DEFAULT_TESTING_ARCHIVE_ENDPOINT,
        )
    }
}

impl ReleaseSource for HttpReleaseSource {
    fn fetch_releases(&self, platform: &str, include_beta: bool) -> Result<Releases> {
        let published = self.fetch_published(platform)?;

        let mut releases = Releases::new();
        let beta = if include_beta {
            published.beta
        } else {
            Vec::new()
        };
        for release in published.official.into_iter().chain(beta) {
            releases.insert(release.version.clone(), release);
        }
        Ok(releases)
    }

    fn fetch_release(
        &self,
        platform: &str,
        version: &str,
        revision: Option<&str>,
    ) -> Result<EditorRelease> {
        if let Some(revision) = revision.filter(|r| !r.is_empty()) {
            return self.fetch_archived(platform, version, revision);
        }

        let releases = self.fetch_releases(platform, is_prerelease(version))?;
        releases
            .into_values()
            .filter(|r| r.version.starts_with(version))
            .max_by(|a, b| compare_versions(&a.version, &b.version))
            .ok_or_else(|| InstallerError::Catalog {
                message: format!("no such version: {} {}", version, platform),
            })
    }
}
