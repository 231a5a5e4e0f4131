//! Distill command implementation.
//!
//! The `unity-installer distill` command resolves a release once and writes it
//! out, with the requested modules selected, for a later `apply`.

use std::collections::HashSet;
use std::fs;
use std::io::Write;

use crate::cli::args::DistillArgs;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::release::EditorRelease;
use crate::ui::UserInterface;

use super::context::{lookup_release, release_source};
use super::dispatcher::{Command, CommandResult};

/// The distill command implementation.
pub struct DistillCommand {
    config: InstallerConfig,
    args: DistillArgs,
}

impl DistillCommand {
    pub fn new(config: &InstallerConfig, args: DistillArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

/// Copy of `release` with exactly `modules` selected.
pub fn distill(release: &EditorRelease, modules: &[String]) -> EditorRelease {
    let wanted: HashSet<&str> = modules.iter().map(String::as_str).collect();
    EditorRelease {
        modules: release
            .modules
            .iter()
            .map(|m| m.with_selected(wanted.contains(m.id.as_str())))
            .collect(),
        ..release.clone()
    }
}

/// Serialize a spec as two-space indented JSON with a trailing newline.
pub fn render_spec(spec: &EditorRelease) -> Result<String> {
    let mut json = serde_json::to_string_pretty(spec).map_err(anyhow::Error::from)?;
    json.push('\n');
    Ok(json)
}

impl Command for DistillCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (version, revision) = self.args.selector.version_and_revision()?;
        let source = release_source(&self.config);
        let release = lookup_release(
            &source,
            &self.config.platform,
            &version,
            revision.as_deref(),
            ui,
        )?;

        for id in &self.args.selector.modules {
            if release.find_module(id).is_none() {
                ui.warning(&format!(
                    "Unity {} has no module {}",
                    release.version, id
                ));
            }
        }

        let spec = distill(&release, &self.args.selector.modules);
        let json = render_spec(&spec)?;

        match &self.args.output {
            Some(path) => {
                fs::write(path, json)?;
                ui.success(&format!("Wrote install spec to {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(json.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::ModuleRelease;

    fn release() -> EditorRelease {
        EditorRelease {
            version: "2020.3.5f1".into(),
            modules: ["android", "ios", "webgl"]
                .iter()
                .map(|id| ModuleRelease {
                    id: id.to_string(),
                    selected: *id == "webgl",
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn only_requested_modules_are_selected() {
        let spec = distill(&release(), &["ios".to_string(), "switch".to_string()]);
        assert_eq!(spec.selected_module_ids(), vec!["ios"]);
        assert_eq!(spec.modules.len(), 3);
    }

    #[test]
    fn rendered_spec_uses_two_space_indent() {
        let json = render_spec(&distill(&release(), &[])).unwrap();
        assert!(json.starts_with("{\n  \""));
        assert!(json.ends_with("}\n"));

        let parsed: EditorRelease = serde_json::from_str(&json).unwrap();
        assert!(parsed.selected_module_ids().is_empty());
    }
}
