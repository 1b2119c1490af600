//! Agent package record, local artifact and declaration template

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::WorkflowError;

/// Installed-package name reported by appliances for the telemetry agent.
pub const DEFAULT_AGENT_NAME: &str = "f5-telemetry";

/// Where the appliance's file-transfer endpoint stores uploads.
pub const DEFAULT_REMOTE_DIR: &str = "/var/config/rest/downloads";

fn default_agent_name() -> String {
    DEFAULT_AGENT_NAME.to_string()
}

/// An installable agent artifact plus its version metadata.
///
/// `version` is not read from the record body: it is the key the record is
/// filed under in the settings file and is filled in at load time.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Package {
    #[serde(skip)]
    pub version: String,

    /// Local path of the artifact to upload
    #[serde(alias = "Filepath", default)]
    pub filepath: String,

    /// Directory the appliance stores uploads in; empty means the default
    #[serde(alias = "Remotepath", default)]
    pub remotepath: String,

    /// Expected SHA-256 of the artifact, hex; empty disables the check
    #[serde(alias = "Sha256sum", default)]
    pub sha256sum: String,

    /// Name reported in installed-package listings
    #[serde(alias = "Name", default = "default_agent_name")]
    pub name: String,

    #[serde(alias = "Release", default)]
    pub release: String,

    #[serde(alias = "Arch", default)]
    pub arch: String,

    /// Full installed-package identifier, e.g. `f5-telemetry-1.20.0-3.noarch`
    #[serde(rename = "packageName", alias = "PackageName", default)]
    pub package_name: String,
}

impl Package {
    /// File name component of the local artifact path.
    pub fn file_name(&self) -> &str {
        Path::new(&self.filepath)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.filepath)
    }

    /// Path of the uploaded artifact on the appliance, as the installer expects it.
    pub fn remote_file_path(&self) -> String {
        let dir = self.remotepath.trim_end_matches('/');
        let dir = if dir.is_empty() { DEFAULT_REMOTE_DIR } else { dir };
        format!("{dir}/{}", self.file_name())
    }

    /// `version-release.arch` label used in plans and logs.
    pub fn label(&self) -> String {
        let mut label = self.version.clone();
        if !self.release.is_empty() {
            label.push('-');
            label.push_str(&self.release);
        }
        if !self.arch.is_empty() {
            label.push('.');
            label.push_str(&self.arch);
        }
        label
    }
}

/// Artifact bytes read from disk, ready for upload.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Read the package artifact and check it against the recorded checksum.
    pub async fn load(package: &Package) -> Result<Self, WorkflowError> {
        let bytes =
            tokio::fs::read(&package.filepath)
                .await
                .map_err(|e| WorkflowError::Artifact {
                    path: package.filepath.clone(),
                    reason: e.to_string(),
                })?;

        let expected = package.sha256sum.trim();
        if !expected.is_empty() {
            let actual = format!("{:x}", Sha256::digest(&bytes));
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(WorkflowError::ChecksumMismatch {
                    path: package.filepath.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(Self {
            file_name: package.file_name().to_string(),
            bytes,
        })
    }
}

/// Declaration payload deployed verbatim to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(Arc<[u8]>);

impl Template {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
