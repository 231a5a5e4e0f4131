//! Package installation: artifact formats, relocation and the module manifest.

pub mod format;
pub mod local;
pub mod relocate;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::release::{InstallOptions, ModuleRelease};

pub use format::ArtifactKind;
pub use local::LocalInstaller;
pub use relocate::{merge_directory, normalize_path, relocate};

/// Name of the installed module manifest, relative to an editor install.
pub const MODULES_FILE: &str = "modules.json";

/// Applies downloaded artifacts to an editor installation.
pub trait PackageInstaller {
    /// Install `artifact` under `destination`, the editor's install root.
    fn install_package(
        &self,
        artifact: &Path,
        destination: &Path,
        options: &InstallOptions,
    ) -> Result<()>;

    /// Replace the module manifest of the install at `destination`.
    fn store_modules(&self, destination: &Path, modules: &[ModuleRelease]) -> Result<()>;

    /// Release any resources held by the installer.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: PackageInstaller + ?Sized> PackageInstaller for Box<T> {
    fn install_package(
        &self,
        artifact: &Path,
        destination: &Path,
        options: &InstallOptions,
    ) -> Result<()> {
        (**self).install_package(artifact, destination, options)
    }

    fn store_modules(&self, destination: &Path, modules: &[ModuleRelease]) -> Result<()> {
        (**self).store_modules(destination, modules)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Substitute `{UNITY_PATH}` and normalize the result.
pub fn resolve_template(template: &str, unity_path: &Path) -> PathBuf {
    let substituted = template.replace("{UNITY_PATH}", &unity_path.to_string_lossy());
    normalize_path(Path::new(&substituted))
}
