//! Install command implementation.
//!
//! The `unity-installer install` command makes sure an editor version and a
//! set of modules are installed, doing nothing when they already are.

use crate::cli::args::InstallArgs;
use crate::config::InstallerConfig;
use crate::engine::has_editor_and_modules;
use crate::error::Result;
use crate::ui::UserInterface;

use super::context::{install_release, lookup_release, release_source};
use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    config: InstallerConfig,
    args: InstallArgs,
}

impl InstallCommand {
    pub fn new(config: &InstallerConfig, args: InstallArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (version, revision) = self.args.selector.version_and_revision()?;
        let modules = &self.args.selector.modules;

        // Answered from disk alone so a satisfied install never needs the
        // catalog or an elevation prompt.
        if !self.args.force
            && matches!(
                has_editor_and_modules(&self.config.editor_path(&version), modules),
                Ok(true)
            )
        {
            ui.success(&format!(
                "Unity {} already has every requested module",
                version
            ));
            return Ok(CommandResult::success());
        }

        let source = release_source(&self.config);
        let release = lookup_release(
            &source,
            &self.config.platform,
            &version,
            revision.as_deref(),
            ui,
        )?;

        install_release(&self.config, &release, modules, self.args.force, ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::VersionSelector;
    use crate::package::MODULES_FILE;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn satisfied_install_skips_catalog() {
        let temp = TempDir::new().unwrap();
        let editor = temp.path().join("2020.3.5f1");
        fs::create_dir_all(editor.join("Editor")).unwrap();
        fs::write(editor.join("Editor/Unity"), "").unwrap();
        fs::write(
            editor.join(MODULES_FILE),
            r#"[{"id":"android","selected":true}]"#,
        )
        .unwrap();

        // An unreachable catalog proves nothing is fetched.
        let config = InstallerConfig {
            install_path: temp.path().to_path_buf(),
            releases_endpoint: "http://127.0.0.1:9/".into(),
            ..Default::default()
        };
        let args = InstallArgs {
            selector: VersionSelector {
                version: Some("2020.3.5f1".into()),
                modules: vec!["android".into()],
                ..Default::default()
            },
            force: false,
        };

        let mut ui = MockUI::new();
        let result = InstallCommand::new(&config, args).execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_success("already has every requested module"));
        assert!(ui.spinners().is_empty());
    }
}
