//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{ElevationMode, InstallerConfig};
use crate::error::Result;
use crate::release::ProjectVersion;
use crate::ui::OutputMode;

/// Installs Unity editors and modules, skipping whatever is already present.
#[derive(Debug, Parser)]
#[command(name = "unity-installer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config location)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint to fetch Unity releases from
    #[arg(long, global = true, env = "UNITY_RELEASES_ENDPOINT")]
    pub releases_endpoint: Option<String>,

    /// Endpoint to fetch archived Unity releases from
    #[arg(long, global = true, env = "UNITY_ARCHIVE_ENDPOINT")]
    pub archive_endpoint: Option<String>,

    /// Directory to install Unity editors into
    #[arg(long, global = true, env = "UNITY_INSTALL_PATH")]
    pub install_path: Option<PathBuf>,

    /// Unity host platform (win32, darwin, linux)
    #[arg(long, global = true, env = "UNITY_PLATFORM")]
    pub platform: Option<String>,

    /// When to install through an elevated helper process
    #[arg(long, global = true, value_enum)]
    pub elevation: Option<ElevationMode>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line and environment overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut InstallerConfig) {
        if let Some(endpoint) = &self.releases_endpoint {
            config.releases_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.archive_endpoint {
            config.archive_endpoint = endpoint.clone();
            config.testing_archive_endpoint = endpoint.clone();
        }
        if let Some(path) = &self.install_path {
            config.install_path = path.clone();
        }
        if let Some(platform) = &self.platform {
            config.platform = platform.clone();
        }
        if let Some(elevation) = self.elevation {
            config.elevation = elevation;
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a Unity version (optionally with modules)
    Install(InstallArgs),

    /// Apply a previously distilled install spec
    Apply(ApplyArgs),

    /// Create an install spec to install later
    Distill(DistillArgs),

    /// List available Unity versions
    List(ListArgs),

    /// Show the modules installed for a Unity version
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Which editor release to act on.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VersionSelector {
    /// Path to Unity project to match version for
    #[arg(long, value_name = "PROJECT")]
    pub for_project: Option<PathBuf>,

    /// Unity version to install
    #[arg(long, required_unless_present = "for_project")]
    pub version: Option<String>,

    /// Unity revision to install
    #[arg(long)]
    pub revision: Option<String>,

    /// Extra modules to install (can be repeated to specify multiple modules)
    #[arg(long = "module", value_name = "MODULE")]
    pub modules: Vec<String>,
}

impl VersionSelector {
    /// Resolve the requested version and optional revision.
    ///
    /// A project's `ProjectVersion.txt` takes precedence over `--version`.
    pub fn version_and_revision(&self) -> Result<(String, Option<String>)> {
        if let Some(project) = &self.for_project {
            return Ok(ProjectVersion::from_project(project)?.version_and_revision());
        }

        let version = self.version.clone().ok_or_else(|| {
            anyhow::anyhow!("either --version or --for-project must be given")
        })?;
        Ok((version, self.revision.clone()))
    }
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub selector: VersionSelector,

    /// Reinstall Unity even if it is already present
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `apply` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ApplyArgs {
    /// Spec file to apply
    pub spec: PathBuf,

    /// Extra modules to install whilst applying
    #[arg(long = "module", value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Reinstall Unity even if it is already present
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `distill` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DistillArgs {
    #[command(flatten)]
    pub selector: VersionSelector,

    /// Output path for spec (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Leave out alpha and beta releases
    #[arg(long)]
    pub no_beta: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Unity version to inspect
    pub version: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn install_accepts_repeated_modules() {
        let cli = Cli::try_parse_from([
            "unity-installer",
            "install",
            "--version",
            "2020.3.5f1",
            "--module",
            "android",
            "--module",
            "ios",
        ])
        .unwrap();

        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.selector.version.as_deref(), Some("2020.3.5f1"));
                assert_eq!(args.selector.modules, vec!["android", "ios"]);
                assert!(!args.force);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn install_requires_version_or_project() {
        assert!(Cli::try_parse_from(["unity-installer", "install"]).is_err());
        assert!(
            Cli::try_parse_from(["unity-installer", "install", "--for-project", "."]).is_ok()
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "unity-installer",
            "list",
            "--platform",
            "linux",
            "--install-path",
            "/opt/unity",
        ])
        .unwrap();
        assert_eq!(cli.platform.as_deref(), Some("linux"));
        assert_eq!(cli.install_path, Some(PathBuf::from("/opt/unity")));
    }

    #[test]
    fn archive_endpoint_overrides_both_archives() {
        let cli = Cli::try_parse_from([
            "unity-installer",
            "--archive-endpoint",
            "http://mirror/",
            "--elevation",
            "never",
            "list",
        ])
        .unwrap();

        let mut config = InstallerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.archive_endpoint, "http://mirror/");
        assert_eq!(config.testing_archive_endpoint, "http://mirror/");
        assert_eq!(config.elevation, ElevationMode::Never);
    }

    #[test]
    fn selector_prefers_project_version() {
        let temp = tempfile::TempDir::new().unwrap();
        let settings = temp.path().join("ProjectSettings");
        std::fs::create_dir_all(&settings).unwrap();
        std::fs::write(
            settings.join("ProjectVersion.txt"),
            "m_EditorVersion: 2020.3.5f1\nm_EditorVersionWithRevision: 2020.3.5f1 (8095aa901b9b)\n",
        )
        .unwrap();

        let selector = VersionSelector {
            for_project: Some(temp.path().to_path_buf()),
            version: Some("2019.4.1f1".into()),
            ..Default::default()
        };
        assert_eq!(
            selector.version_and_revision().unwrap(),
            ("2020.3.5f1".to_string(), Some("8095aa901b9b".to_string()))
        );
    }
}
