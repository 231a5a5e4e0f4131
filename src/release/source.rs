//! The release catalog interface.

use super::model::{EditorRelease, Releases};
use crate::error::Result;

/// Lists released editor versions and their metadata.
pub trait ReleaseSource: Send + Sync {
    /// All published releases for a platform, optionally including betas.
    fn fetch_releases(&self, platform: &str, include_beta: bool) -> Result<Releases>;

    /// A single release. Without a revision the newest published release whose
    /// version starts with `version` is returned.
    fn fetch_release(
        &self,
        platform: &str,
        version: &str,
        revision: Option<&str>,
    ) -> Result<EditorRelease>;
}

impl<S: ReleaseSource + ?Sized> ReleaseSource for Box<S> {
    fn fetch_releases(&self, platform: &str, include_beta: bool) -> Result<Releases> {
        (**self).fetch_releases(platform, include_beta)
    }

    fn fetch_release(
        &self,
        platform: &str,
        version: &str,
        revision: Option<&str>,
    ) -> Result<EditorRelease> {
        (**self).fetch_release(platform, version, revision)
    }
}
