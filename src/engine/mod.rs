//! Installation engine: inspect what is installed, download what is missing
//! and apply it through a package installer.

pub mod cancel;
pub mod download;
pub mod editor;
pub mod inspect;
pub mod reconcile;

pub use cancel::CancelToken;
pub use download::Downloader;
pub use editor::{merge_manifest, EditorInstaller};
pub use inspect::{has_editor, inspect, InstalledState};
pub use reconcile::{has_editor_and_modules, Outcome, Reconciler};

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use zip::write::SimpleFileOptions;

    use crate::error::Result;
    use crate::package::PackageInstaller;
    use crate::release::{EditorRelease, InstallOptions, ModuleRelease, Package};

    /// A zip archive holding `entries` as (name, content) pairs.
    pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// A release whose editor is `/Unity.zip` and whose modules are `/<id>.zip`.
    pub fn release_on(base_url: &str, version: &str, module_ids: &[&str]) -> EditorRelease {
        EditorRelease {
            package: Package {
                download_url: format!("{}/Unity.zip", base_url),
                ..Default::default()
            },
            version: version.to_string(),
            lts: false,
            modules: module_ids
                .iter()
                .map(|id| ModuleRelease {
                    package: Package {
                        download_url: format!("{}/{}.zip", base_url, id),
                        ..Default::default()
                    },
                    id: id.to_string(),
                    name: id.to_string(),
                    visible: true,
                    ..Default::default()
                })
                .collect(),
        }
    }

    /// Records the artifact names passed to an inner installer.
    #[derive(Clone)]
    pub struct Recording<I> {
        inner: I,
        installs: Arc<Mutex<Vec<String>>>,
    }

    impl<I> Recording<I> {
        pub fn new(inner: I) -> Self {
            Self {
                inner,
                installs: Arc::default(),
            }
        }

        /// Artifact file names installed so far, without the download prefix.
        pub fn installs(&self) -> Vec<String> {
            self.installs.lock().unwrap().clone()
        }

        pub fn clear(&self) {
            self.installs.lock().unwrap().clear();
        }
    }

    impl<I: PackageInstaller> PackageInstaller for Recording<I> {
        fn install_package(
            &self,
            artifact: &Path,
            destination: &Path,
            options: &InstallOptions,
        ) -> Result<()> {
            let name = artifact
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = match name.split_once('-') {
                Some((_, rest)) => rest.to_string(),
                None => name,
            };
            self.installs.lock().unwrap().push(name);
            self.inner.install_package(artifact, destination, options)
        }

        fn store_modules(&self, destination: &Path, modules: &[ModuleRelease]) -> Result<()> {
            self.inner.store_modules(destination, modules)
        }
    }
}
