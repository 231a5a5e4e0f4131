//! Apply command implementation.
//!
//! The `unity-installer apply` command installs a spec written by `distill`:
//! the editor release it describes plus every module flagged as selected.

use std::fs;
use std::path::Path;

use crate::cli::args::ApplyArgs;
use crate::config::InstallerConfig;
use crate::engine::has_editor_and_modules;
use crate::error::{InstallerError, Result};
use crate::release::EditorRelease;
use crate::ui::UserInterface;

use super::context::install_release;
use super::dispatcher::{Command, CommandResult};

/// The apply command implementation.
pub struct ApplyCommand {
    config: InstallerConfig,
    args: ApplyArgs,
}

impl ApplyCommand {
    pub fn new(config: &InstallerConfig, args: ApplyArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

/// Read a distilled install spec.
pub fn load_spec(path: &Path) -> Result<EditorRelease> {
    let content = fs::read_to_string(path).map_err(|e| InstallerError::ConfigParse {
        path: path.to_path_buf(),
        message: format!("failed to open spec: {}", e),
    })?;
    serde_json::from_str(&content).map_err(|e| InstallerError::ConfigParse {
        path: path.to_path_buf(),
        message: format!("failed to decode spec: {}", e),
    })
}

impl Command for ApplyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let spec = load_spec(&self.args.spec)?;

        let mut modules = spec.selected_module_ids();
        modules.extend(self.args.modules.iter().cloned());

        if !self.args.force
            && matches!(
                has_editor_and_modules(&self.config.editor_path(&spec.version), &modules),
                Ok(true)
            )
        {
            ui.success(&format!(
                "Unity {} already has every requested module",
                spec.version
            ));
            return Ok(CommandResult::success());
        }

        install_release(&self.config, &spec, &modules, self.args.force, ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::MODULES_FILE;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    const SPEC: &str = r#"{
  "downloadUrl": "http://127.0.0.1:9/Unity.zip",
  "version": "2020.3.5f1",
  "lts": true,
  "modules": [
    { "id": "android", "downloadUrl": "http://127.0.0.1:9/android.zip", "visible": true, "selected": true },
    { "id": "ios", "downloadUrl": "http://127.0.0.1:9/ios.zip", "visible": true, "selected": false }
  ]
}"#;

    #[test]
    fn load_spec_reads_selection() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spec.json");
        fs::write(&path, SPEC).unwrap();

        let spec = load_spec(&path).unwrap();
        assert_eq!(spec.version, "2020.3.5f1");
        assert_eq!(spec.selected_module_ids(), vec!["android"]);
    }

    #[test]
    fn missing_spec_is_parse_error() {
        let err = load_spec(Path::new("/nonexistent/spec.json")).unwrap_err();
        assert!(matches!(err, InstallerError::ConfigParse { .. }));
    }

    #[test]
    fn malformed_spec_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spec.json");
        fs::write(&path, "[]").unwrap();

        let err = load_spec(&path).unwrap_err();
        assert!(err.to_string().contains("failed to decode spec"));
    }

    #[test]
    fn satisfied_spec_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let spec_path = temp.path().join("spec.json");
        fs::write(&spec_path, SPEC).unwrap();

        let editor = temp.path().join("editors").join("2020.3.5f1");
        fs::create_dir_all(editor.join("Editor")).unwrap();
        fs::write(editor.join("Editor/Unity.exe"), "").unwrap();
        fs::write(
            editor.join(MODULES_FILE),
            r#"[{"id":"android","selected":true},{"id":"ios","selected":false}]"#,
        )
        .unwrap();

        let config = InstallerConfig {
            install_path: temp.path().join("editors"),
            ..Default::default()
        };
        let args = ApplyArgs {
            spec: spec_path,
            modules: Vec::new(),
            force: false,
        };

        let mut ui = MockUI::new();
        let result = ApplyCommand::new(&config, args).execute(&mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_success("2020.3.5f1"));
    }
}
