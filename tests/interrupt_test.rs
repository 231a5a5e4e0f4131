//! Terminal interrupts during an install.
#![cfg(unix)]
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use httpmock::prelude::*;
use std::fs;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const SLOW_INSTALLER: &str = r#"#!/bin/sh
dest="${2#/D=}"
mkdir -p "$dest"
touch "$dest/started"
sleep 2
mkdir -p "$dest/Editor"
echo editor > "$dest/Editor/Unity"
"#;

fn wait_for(path: &std::path::Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn interrupt_lets_running_installer_finish_then_stops() {
    let server = MockServer::start();
    let base = server.base_url();
    let releases = format!(
        r#"{{"official":[{{"version":"2020.3.5f1","downloadUrl":"{base}/UnitySetup",
            "modules":[{{"id":"android","downloadUrl":"{base}/android.zip","visible":true}}]}}],
            "beta":[]}}"#
    );
    server.mock(|when, then| {
        when.method(GET).path("/releases-linux.json");
        then.status(200).body(releases);
    });
    server.mock(|when, then| {
        when.method(GET).path("/UnitySetup");
        then.status(200).body(SLOW_INSTALLER);
    });
    let module = server.mock(|when, then| {
        when.method(GET).path("/android.zip");
        then.status(500);
    });

    let root = TempDir::new().unwrap();
    let editor = root.path().join("editors").join("2020.3.5f1");

    // A process group of its own stands in for the terminal's foreground group.
    let mut command = Command::new(cargo_bin("unity-installer"));
    command
        .env("XDG_CONFIG_HOME", root.path().join("config"))
        .env("NO_COLOR", "1")
        .args([
            "--releases-endpoint",
            base.as_str(),
            "--platform",
            "linux",
            "--elevation",
            "never",
            "--install-path",
        ])
        .arg(root.path().join("editors"))
        .args(["install", "--version", "2020.3.5f1", "--module", "android"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);
    let child = command.spawn().unwrap();
    let group = child.id() as libc::pid_t;

    assert!(
        wait_for(&editor.join("started"), Duration::from_secs(30)),
        "installer never started"
    );
    // SAFETY: signals only the process group created for this test.
    unsafe { libc::kill(-group, libc::SIGINT) };

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Installation cancelled"), "{}", stderr);
    assert_eq!(
        fs::read_to_string(editor.join("Editor/Unity")).unwrap().trim(),
        "editor"
    );
    module.assert_hits(0);
}
