//! Artifact downloads.
//!
//! Artifacts are streamed into a scratch directory that lives as long as the
//! [`Downloader`]; nothing is reused between runs.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{InstallerError, Result};
use crate::release::Package;
use crate::ui::progress::{download_bar, format_size};

const CHUNK_SIZE: usize = 64 * 1024;

/// Downloads package artifacts to local files.
pub struct Downloader {
    client: reqwest::blocking::Client,
    scratch: TempDir,
    verify_checksums: bool,
    show_progress: bool,
    count: AtomicUsize,
}

impl Downloader {
    pub fn new(verify_checksums: bool, show_progress: bool) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;
        let scratch = tempfile::Builder::new()
            .prefix("unity-installer-")
            .tempdir()?;

        Ok(Self {
            client,
            scratch,
            verify_checksums,
            show_progress,
            count: AtomicUsize::new(0),
        })
    }

    /// Directory downloads are written into.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Download a package's artifact, returning its local path.
    pub fn download(&self, package: &Package) -> Result<PathBuf> {
        let url = package.download_url.as_str();
        let transfer_error = |message: String| InstallerError::Transfer {
            url: url.to_string(),
            message,
        };

        let name = artifact_name(url);
        let n = self.count.fetch_add(1, Ordering::Relaxed);
        let path = self.scratch.path().join(format!("{}-{}", n, name));
        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| transfer_error(e.to_string()))?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(transfer_error(format!("HTTP {}", status.as_u16())));
        }

        let total = response.content_length().unwrap_or(package.download_size);
        let bar = download_bar(name, total, self.show_progress);

        let mut file = File::create(&path)?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut received: u64 = 0;
        loop {
            let n = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    bar.abandon();
                    return Err(transfer_error(e.to_string()));
                }
            };
            file.write_all(&buf[..n])?;
            hasher.update(&buf[..n]);
            bar.inc(n as u64);
            received += n as u64;
        }
        file.flush()?;
        drop(file);
        bar.finish_and_clear();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }

        if self.verify_checksums {
            let actual = hex::encode(hasher.finalize());
            verify_checksum(&package.install_options.checksum, &actual)
                .map_err(transfer_error)?;
        }

        debug!(
            "Downloaded {} ({}) to {}",
            url,
            format_size(received),
            path.display()
        );
        Ok(path)
    }

    /// Delete a downloaded artifact once it has been installed.
    pub fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            debug!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

/// File name of the artifact at `url`, without query or fragment.
pub fn artifact_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "package",
    }
}

fn is_sha256(checksum: &str) -> bool {
    checksum.len() == 64 && checksum.chars().all(|c| c.is_ascii_hexdigit())
}

/// Compare an advertised checksum against the SHA-256 of the download.
fn verify_checksum(expected: &str, actual_sha256: &str) -> std::result::Result<(), String> {
    let expected = expected.trim();
    if expected.is_empty() {
        debug!("No checksum advertised");
        return Ok(());
    }
    if !is_sha256(expected) {
        warn!("Skipping verification of unsupported checksum {}", expected);
        return Ok(());
    }
    if !expected.eq_ignore_ascii_case(actual_sha256) {
        return Err(format!(
            "checksum mismatch: expected {}, got {}",
            expected, actual_sha256
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::InstallOptions;
    use httpmock::prelude::*;

    fn package(url: String, checksum: &str) -> Package {
        Package {
            install_options: InstallOptions {
                checksum: checksum.to_string(),
                ..Default::default()
            },
            download_url: url,
            ..Default::default()
        }
    }

    fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    #[test]
    fn artifact_name_strips_query() {
        assert_eq!(
            artifact_name("https://cdn.example.com/a/UnitySetup64.exe?sig=1"),
            "UnitySetup64.exe"
        );
        assert_eq!(artifact_name("https://cdn.example.com/"), "package");
    }

    #[test]
    fn downloads_body_to_scratch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/Unity.zip");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new(false, false).unwrap();
        let path = downloader
            .download(&package(server.url("/Unity.zip"), ""))
            .unwrap();

        mock.assert();
        assert!(path.starts_with(downloader.scratch_dir()));
        assert!(path.to_string_lossy().ends_with("Unity.zip"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "payload");

        downloader.discard(&path);
        assert!(!path.exists());
    }

    #[test]
    fn same_name_downloads_do_not_collide() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a/Setup.exe");
            then.status(200).body("a");
        });
        server.mock(|when, then| {
            when.method(GET).path("/b/Setup.exe");
            then.status(200).body("b");
        });

        let downloader = Downloader::new(false, false).unwrap();
        let a = downloader.download(&package(server.url("/a/Setup.exe"), "")).unwrap();
        let b = downloader.download(&package(server.url("/b/Setup.exe"), "")).unwrap();

        assert_ne!(a, b);
        assert_eq!(fs::read_to_string(a).unwrap(), "a");
        assert_eq!(fs::read_to_string(b).unwrap(), "b");
    }

    #[test]
    fn non_ok_status_is_transfer_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.zip");
            then.status(404);
        });

        let downloader = Downloader::new(false, false).unwrap();
        let err = downloader
            .download(&package(server.url("/missing.zip"), ""))
            .unwrap_err();
        match err {
            InstallerError::Transfer { message, .. } => assert!(message.contains("404")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn matching_sha256_is_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Unity.zip");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new(true, false).unwrap();
        let checksum = sha256_hex(b"payload").to_uppercase();
        assert!(downloader
            .download(&package(server.url("/Unity.zip"), &checksum))
            .is_ok());
    }

    #[test]
    fn mismatched_sha256_is_transfer_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Unity.zip");
            then.status(200).body("tampered");
        });

        let downloader = Downloader::new(true, false).unwrap();
        let err = downloader
            .download(&package(server.url("/Unity.zip"), &sha256_hex(b"payload")))
            .unwrap_err();
        assert!(matches!(err, InstallerError::Transfer { .. }));
    }

    #[test]
    fn md5_checksums_are_skipped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Unity.zip");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new(true, false).unwrap();
        let md5 = "0123456789abcdef0123456789abcdef";
        assert!(downloader
            .download(&package(server.url("/Unity.zip"), md5))
            .is_ok());
    }

    #[test]
    fn checksums_ignored_unless_enabled() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Unity.zip");
            then.status(200).body("tampered");
        });

        let downloader = Downloader::new(false, false).unwrap();
        assert!(downloader
            .download(&package(server.url("/Unity.zip"), &sha256_hex(b"payload")))
            .is_ok());
    }
}
