//! Shared plumbing for commands that resolve releases or install them.

use std::time::Instant;
use tracing::warn;

use crate::config::InstallerConfig;
use crate::engine::{CancelToken, Downloader, EditorInstaller, Outcome, Reconciler};
use crate::error::Result;
use crate::package::PackageInstaller;
use crate::release::{EditorRelease, HttpReleaseSource, ReleaseCache, ReleaseSource};
use crate::service::default_installer;
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::CommandResult;

/// The release catalog described by `config`.
pub fn release_source(config: &InstallerConfig) -> ReleaseCache<HttpReleaseSource> {
    ReleaseCache::new(HttpReleaseSource::new(
        config.releases_endpoint.clone(),
        config.archive_endpoint.clone(),
        config.testing_archive_endpoint.clone(),
    ))
}

/// Look up a release, showing a spinner while the catalog is queried.
pub fn lookup_release(
    source: &dyn ReleaseSource,
    platform: &str,
    version: &str,
    revision: Option<&str>,
    ui: &mut dyn UserInterface,
) -> Result<EditorRelease> {
    let mut spinner = ui.start_spinner(&format!("Resolving Unity {}", version));
    match source.fetch_release(platform, version, revision) {
        Ok(release) => {
            spinner.finish_success(&format!("Resolved Unity {}", release.version));
            Ok(release)
        }
        Err(e) => {
            spinner.finish_error(&format!("Could not resolve Unity {}", version));
            Err(e)
        }
    }
}

/// A reconciler that installs through the installer `config` selects.
pub fn reconciler(
    config: &InstallerConfig,
    show_progress: bool,
) -> Result<Reconciler<Box<dyn PackageInstaller>>> {
    let downloader = Downloader::new(config.verify_checksums, show_progress)?;
    let installer = default_installer(config)?;
    let editors = EditorInstaller::new(&config.install_path, installer, downloader);
    Ok(Reconciler::new(editors, CancelToken::from_signals()))
}

/// Bring `release` up to `modules` and report what happened.
pub fn install_release(
    config: &InstallerConfig,
    release: &EditorRelease,
    modules: &[String],
    force: bool,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    ui.show_header(&format!("Unity {}", release.version));
    let started = Instant::now();

    let mut reconciler = reconciler(config, ui.shows_progress())?;
    let result = reconciler.ensure_installed(release, modules, force);
    if let Err(e) = reconciler.close() {
        warn!("Failed to shut down package installer: {}", e);
    }

    match result? {
        Outcome::AlreadySatisfied => {
            ui.success(&format!(
                "Unity {} already has every requested module",
                release.version
            ));
        }
        Outcome::Installed { editor, modules } => {
            if editor {
                ui.success(&format!("Installed Unity {}", release.version));
            }
            for module in modules {
                ui.success(&format!("Installed module {}", module));
            }
            ui.message(&format!(
                "Finished in {}",
                format_duration(started.elapsed())
            ));
        }
    }
    Ok(CommandResult::success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use httpmock::prelude::*;

    #[test]
    fn lookup_failure_finishes_spinner_with_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/releases-linux.json");
            then.status(500);
        });

        let config = InstallerConfig {
            releases_endpoint: server.base_url(),
            ..Default::default()
        };
        let source = release_source(&config);
        let mut ui = MockUI::new();

        let result = lookup_release(&source, "linux", "2020.3", None, &mut ui);
        assert!(result.is_err());
        assert_eq!(ui.spinners(), ["Resolving Unity 2020.3".to_string()]);
        assert_eq!(
            ui.spinner_results(),
            vec!["error: Could not resolve Unity 2020.3".to_string()]
        );
    }

    #[test]
    fn lookup_resolves_newest_matching_release() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/releases-linux.json");
            then.status(200).body(
                r#"{"official":[
                    {"version":"2020.3.4f1","downloadUrl":"a"},
                    {"version":"2020.3.5f1","downloadUrl":"b"}
                ],"beta":[]}"#,
            );
        });

        let config = InstallerConfig {
            releases_endpoint: server.base_url(),
            ..Default::default()
        };
        let mut ui = MockUI::new();
        let release =
            lookup_release(&release_source(&config), "linux", "2020.3", None, &mut ui).unwrap();
        assert_eq!(release.version, "2020.3.5f1");
    }
}
