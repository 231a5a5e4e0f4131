//! Artifact formats and their installers.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::engine::cancel::shield_from_interrupts;
use crate::error::{InstallerError, Result};
use crate::release::InstallOptions;

const XAR: &str = "/usr/bin/xar";
const TAR: &str = "/usr/bin/tar";

/// How an artifact gets installed, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `.zip` archive, extracted in-process.
    Zip,
    /// macOS flat package, unpacked with `xar` and `tar`.
    Pkg,
    /// Anything else is executed as a silent installer.
    Executable,
}

impl ArtifactKind {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("zip") => ArtifactKind::Zip,
            Some("pkg") => ArtifactKind::Pkg,
            _ => ArtifactKind::Executable,
        }
    }

    /// Install `artifact` into the already-resolved `destination`.
    pub fn install(
        self,
        artifact: &Path,
        destination: &Path,
        options: &InstallOptions,
    ) -> Result<()> {
        match self {
            ArtifactKind::Zip => extract_zip(artifact, destination),
            ArtifactKind::Pkg => extract_pkg(artifact, destination),
            ArtifactKind::Executable => run_installer(artifact, destination, options),
        }
    }
}

fn extraction_error(artifact: &Path, message: impl std::fmt::Display) -> InstallerError {
    InstallerError::Extraction {
        artifact: artifact.to_path_buf(),
        message: message.to_string(),
    }
}

fn extract_zip(artifact: &Path, destination: &Path) -> Result<()> {
    let file = File::open(artifact).map_err(|e| extraction_error(artifact, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(artifact, e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_error(artifact, e))?;

        let Some(name) = entry.enclosed_name() else {
            warn!("Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let target = destination.join(name);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out).map_err(|e| extraction_error(artifact, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = entry.unix_mode().unwrap_or(0) & 0o7777;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode | 0o666))?;
        }
    }

    Ok(())
}

fn run_tool(mut command: Command, command_line: String) -> Result<()> {
    debug!("Running {}", command_line);
    shield_from_interrupts(&mut command);
    let status = command.status().map_err(|e| {
        anyhow::Error::new(e).context(format!("failed to launch {}", command_line))
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(InstallerError::Subprocess {
            command: command_line,
            code: status.code(),
        })
    }
}

/// Locate the `*.pkg.tmp` directory `xar` leaves behind.
pub fn find_payload(scratch: &Path) -> Option<PathBuf> {
    fs::read_dir(scratch)
        .ok()?
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().ends_with(".pkg.tmp"))
        .map(|e| e.path())
}

fn extract_pkg(artifact: &Path, destination: &Path) -> Result<()> {
    extract_pkg_in(artifact, destination, &std::env::temp_dir())
}

fn extract_pkg_in(artifact: &Path, destination: &Path, scratch_parent: &Path) -> Result<()> {
    // Removed on drop, whichever step fails.
    let scratch = tempfile::Builder::new()
        .prefix("unity-installer")
        .tempdir_in(scratch_parent)?;

    let mut xar = Command::new(XAR);
    xar.arg("-xf").arg(artifact).arg("-C").arg(scratch.path());
    run_tool(
        xar,
        format!("{} -xf {} -C {}", XAR, artifact.display(), scratch.path().display()),
    )?;

    let payload = find_payload(scratch.path())
        .ok_or_else(|| extraction_error(artifact, "could not find Payload"))?
        .join("Payload");

    let mut tar = Command::new(TAR);
    tar.arg("-C").arg(destination).arg("-zmxf").arg(&payload);
    run_tool(
        tar,
        format!("{} -C {} -zmxf {}", TAR, destination.display(), payload.display()),
    )
}

/// Arguments for a scripted installer.
pub fn installer_args(destination: &Path, options: &InstallOptions) -> Result<Vec<String>> {
    if let Some(command) = &options.command {
        let command = command.replace("{INSTDIR}", &destination.to_string_lossy());
        return shell_words::split(&command).map_err(|e| {
            InstallerError::from(anyhow::anyhow!(
                "invalid installer command '{}': {}",
                command,
                e
            ))
        });
    }

    let mut args = vec!["/S".to_string()];
    if options.destination.is_some() {
        args.push(format!("/D={}", destination.display()));
    }
    Ok(args)
}

fn run_installer(artifact: &Path, destination: &Path, options: &InstallOptions) -> Result<()> {
    let args = installer_args(destination, options)?;
    let command_line = std::iter::once(artifact.display().to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");

    let mut command = Command::new(artifact);
    command.args(&args);
    run_tool(command, command_line)
}
