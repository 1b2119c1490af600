//! Common test utilities for tsfleet integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory holding a settings file and a package artifact
#[allow(dead_code)]
pub struct TestFleet {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the directory root
    pub path: PathBuf,
}

impl TestFleet {
    /// Create a new empty scratch directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file relative to the directory root
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Write `ts-settings.json` and return its path
    pub fn write_settings(&self, json: &str) -> PathBuf {
        self.write_file("ts-settings.json", json)
    }

    /// Write a settings file with one schedule over `targets`, a real artifact
    /// for version 1.20.0 and one template named `default`
    #[allow(dead_code)]
    pub fn write_fleet(&self, targets: &[&str], template: &str) -> PathBuf {
        let artifact = self.write_file("pkgs/f5-telemetry-1.20.0-3.noarch.rpm", "rpm");
        let targets = targets
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.write_settings(&format!(
            r#"{{
                "schedules": [{{"targets": [{targets}], "credential": "admin:admin",
                                "template": "{template}", "version": "1.20.0"}}],
                "packages": {{"1.20.0": {{"filepath": "{}", "release": "3", "arch": "noarch",
                                          "packageName": "f5-telemetry-1.20.0-3.noarch"}}}},
                "templates": {{"default": {{"class": "Telemetry"}}}}
            }}"#,
            artifact.display()
        ))
    }
}

/// The tsfleet binary with the environment cleared of tsfleet settings
// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn tsfleet_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tsfleet").expect("tsfleet binary should be built");
    cmd.env_remove("TSFLEET_CONCURRENCY")
        .env_remove("TSFLEET_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
