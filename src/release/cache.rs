//! In-memory memoization of catalog lookups.

use std::collections::HashMap;
use std::sync::Mutex;

use super::model::{EditorRelease, Releases};
use super::source::ReleaseSource;
use crate::error::Result;

#[derive(Default)]
struct CacheState {
    releases: HashMap<(String, bool), Releases>,
    revisions: HashMap<String, EditorRelease>,
}

/// Wraps a [`ReleaseSource`] so each lookup hits the network at most once.
///
/// Failed lookups are not cached.
pub struct ReleaseCache<S> {
    inner: S,
    state: Mutex<CacheState>,
}

impl<S: ReleaseSource> ReleaseCache<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: ReleaseSource> ReleaseSource for ReleaseCache<S> {
    fn fetch_releases(&self, platform: &str, include_beta: bool) -> Result<Releases> {
        let mut state = self.lock();
        let key = (platform.to_string(), include_beta);

        if let Some(existing) = state.releases.get(&key) {
            return Ok(existing.clone());
        }

        let releases = self.inner.fetch_releases(platform, include_beta)?;
        state.releases.insert(key, releases.clone());
        Ok(releases)
    }

    fn fetch_release(
        &self,
        platform: &str,
        version: &str,
        revision: Option<&str>,
    ) -> Result<EditorRelease> {
        let mut state = self.lock();
        let key = format!("{}:{}@{}", platform, version, revision.unwrap_or_default());

        if let Some(existing) = state.revisions.get(&key) {
            return Ok(existing.clone());
        }

        let release = self.inner.fetch_release(platform, version, revision)?;
        state.revisions.insert(key, release.clone());
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstallerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ReleaseSource for CountingSource {
        fn fetch_releases(&self, _platform: &str, include_beta: bool) -> Result<Releases> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut releases = Releases::new();
            releases.insert(
                "2020.3.5f1".into(),
                EditorRelease {
                    version: "2020.3.5f1".into(),
                    ..Default::default()
                },
            );
            if include_beta {
                releases.insert(
                    "2021.1.0b3".into(),
                    EditorRelease {
                        version: "2021.1.0b3".into(),
                        ..Default::default()
                    },
                );
            }
            Ok(releases)
        }

        fn fetch_release(
            &self,
            _platform: &str,
            version: &str,
            _revision: Option<&str>,
        ) -> Result<EditorRelease> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(InstallerError::Catalog {
                    message: "offline".into(),
                });
            }
            Ok(EditorRelease {
                version: version.into(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn release_lookups_are_memoized() {
        let cache = ReleaseCache::new(CountingSource::default());
        cache.fetch_release("win32", "2020.3.5f1", None).unwrap();
        cache.fetch_release("win32", "2020.3.5f1", None).unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);

        cache
            .fetch_release("win32", "2020.3.5f1", Some("8095aa901b9b"))
            .unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listings_are_keyed_by_beta_flag() {
        let cache = ReleaseCache::new(CountingSource::default());
        assert_eq!(cache.fetch_releases("win32", false).unwrap().len(), 1);
        assert_eq!(cache.fetch_releases("win32", true).unwrap().len(), 2);
        assert_eq!(cache.fetch_releases("win32", false).unwrap().len(), 1);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ReleaseCache::new(CountingSource {
            fail: true,
            ..Default::default()
        });
        assert!(cache.fetch_release("win32", "2020.3.5f1", None).is_err());
        assert!(cache.fetch_release("win32", "2020.3.5f1", None).is_err());
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }
}
