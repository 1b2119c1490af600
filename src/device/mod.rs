//! Device API client capability
//!
//! One method per remote operation against one appliance. The fleet core only
//! sees the [`DeviceApi`] trait; [`HttpDeviceClient`] talks to the real
//! management REST API.

pub mod http;

pub use http::{HttpDeviceClient, HttpDeviceConfig};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Artifact, Package, Target, Template};
use crate::error::DeviceError;

/// Agent information returned by the telemetry info endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryInfo {
    pub node_version: String,
    pub version: String,
    pub release: String,
    pub schema_current: String,
    pub schema_minimum: String,
}

/// Result of a completed version query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The agent answered with its info
    Reported(TelemetryInfo),
    /// The appliance answered with a non-success status; the agent is treated
    /// as not installed
    NotInstalled { status: u16 },
}

impl Verification {
    /// Installed agent version, if the agent reported one.
    pub fn version(&self) -> Option<&str> {
        match self {
            Verification::Reported(info) if !info.version.is_empty() => Some(&info.version),
            _ => None,
        }
    }

    /// Whether the agent reports exactly `version`.
    pub fn is_version(&self, version: &str) -> bool {
        self.version() == Some(version)
    }
}

/// One entry of an appliance's installed-package listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
    pub package_name: String,
}

/// Remote operations the fleet workflows need from an appliance.
///
/// Every method maps a 2xx answer to `Ok`; anything else is a
/// [`DeviceError`] carrying the response body when there was one.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Query the installed agent version.
    ///
    /// Only a transport or decode failure is an error; a non-success status
    /// is reported as [`Verification::NotInstalled`].
    async fn verify(&self, target: &Target) -> Result<Verification, DeviceError>;

    /// Transfer the package artifact to the appliance.
    async fn upload(&self, target: &Target, artifact: &Artifact) -> Result<(), DeviceError>;

    /// Install a previously uploaded package.
    async fn install(&self, target: &Target, package: &Package) -> Result<(), DeviceError>;

    /// List installed packages.
    async fn list_installed(&self, target: &Target) -> Result<Vec<InstalledPackage>, DeviceError>;

    /// Remove an installed package.
    async fn uninstall(
        &self,
        target: &Target,
        package: &InstalledPackage,
    ) -> Result<(), DeviceError>;

    /// Post a declaration to the agent.
    async fn deploy(&self, target: &Target, declaration: &Template) -> Result<(), DeviceError>;
}
