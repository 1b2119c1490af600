//! Test fixtures for driving fleet workflows without real appliances.
//!
//! [`FakeFleet`] is a scripted in-memory [`DeviceApi`]: each address maps to a
//! [`FakeAppliance`] describing how it behaves, and every call is recorded so
//! tests can assert on call order and on how many calls (and how many
//! uploads) overlapped.
//!
//! # Usage
//!
//! ```ignore
//! let fleet = FakeFleet::new()
//!     .with("10.0.0.1", FakeAppliance::running("1.20.0"))
//!     .with("10.0.0.2", FakeAppliance::unreachable());
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::device::{DeviceApi, InstalledPackage, TelemetryInfo, Verification};
use crate::domain::{Artifact, Credential, Package, Target, Template, WorkItem};
use crate::error::DeviceError;

/// Scripted behaviour of one fake appliance.
#[derive(Debug, Clone, Default)]
pub struct FakeAppliance {
    pub reachable: bool,
    /// Version the agent currently reports; `None` answers 404
    pub version: Option<String>,
    /// Verify calls after an install answered with 503 while the agent restarts
    pub restart_reads: u32,
    /// Restart answers still pending; set from `restart_reads` by install
    pub restarting: u32,
    /// Stop answering altogether once the package is installed
    pub drop_after_install: bool,
    pub fail_upload: bool,
    pub fail_install: bool,
    pub fail_deploy: bool,
    pub fail_list: bool,
    pub fail_uninstall: bool,
    pub installed: Vec<InstalledPackage>,
}

impl FakeAppliance {
    /// Reachable appliance without the agent.
    pub fn empty() -> Self {
        Self {
            reachable: true,
            ..Self::default()
        }
    }

    /// Reachable appliance whose agent reports `version`.
    pub fn running(version: &str) -> Self {
        Self {
            reachable: true,
            version: Some(version.to_string()),
            installed: vec![agent_package(version)],
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

/// Installed-package entry for the telemetry agent at `version`.
pub fn agent_package(version: &str) -> InstalledPackage {
    InstalledPackage {
        name: "f5-telemetry".to_string(),
        version: version.to_string(),
        release: "3".to_string(),
        arch: "noarch".to_string(),
        package_name: format!("f5-telemetry-{version}-3.noarch"),
    }
}

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub address: String,
    pub operation: &'static str,
}

/// In-memory [`DeviceApi`] over a set of [`FakeAppliance`]s.
#[derive(Debug, Default)]
pub struct FakeFleet {
    appliances: Mutex<HashMap<String, FakeAppliance>>,
    calls: Mutex<Vec<Call>>,
    deployed: Mutex<HashMap<String, Vec<u8>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    uploads_in_flight: AtomicUsize,
    peak_uploads: AtomicUsize,
    latency: Duration,
}

impl FakeFleet {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(10),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with(self, address: &str, appliance: FakeAppliance) -> Self {
        self.appliances
            .lock()
            .unwrap()
            .insert(address.to_string(), appliance);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Operations called against `address`, in order.
    pub fn operations(&self, address: &str) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter(|c| c.address == address)
            .map(|c| c.operation)
            .collect()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of uploads that were in progress at the same time.
    pub fn peak_uploads(&self) -> usize {
        self.peak_uploads.load(Ordering::SeqCst)
    }

    pub fn appliance(&self, address: &str) -> FakeAppliance {
        self.appliances
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    pub fn deployed(&self, address: &str) -> Option<Vec<u8>> {
        self.deployed.lock().unwrap().get(address).cloned()
    }

    /// Record the call, hold it open for the configured latency and hand back
    /// the appliance script (or a transport error when unreachable).
    async fn enter(
        &self,
        target: &Target,
        operation: &'static str,
    ) -> Result<FakeAppliance, DeviceError> {
        self.calls.lock().unwrap().push(Call {
            address: target.address().to_string(),
            operation,
        });

        let upload = operation == "upload";
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if upload {
            let uploads = self.uploads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_uploads.fetch_max(uploads, Ordering::SeqCst);
        }
        tokio::time::sleep(self.latency).await;
        if upload {
            self.uploads_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let appliance = self.appliance(target.address());
        if appliance.reachable {
            Ok(appliance)
        } else {
            Err(DeviceError::transport("connection refused"))
        }
    }

    fn update(&self, target: &Target, f: impl FnOnce(&mut FakeAppliance)) {
        if let Some(appliance) = self.appliances.lock().unwrap().get_mut(target.address()) {
            f(appliance);
        }
    }
}

#[async_trait]
impl DeviceApi for FakeFleet {
    async fn verify(&self, target: &Target) -> Result<Verification, DeviceError> {
        let appliance = self.enter(target, "verify").await?;
        if appliance.restarting > 0 {
            self.update(target, |a| a.restarting -= 1);
            return Ok(Verification::NotInstalled { status: 503 });
        }
        Ok(match appliance.version {
            Some(version) => Verification::Reported(TelemetryInfo {
                version,
                ..TelemetryInfo::default()
            }),
            None => Verification::NotInstalled { status: 404 },
        })
    }

    async fn upload(&self, target: &Target, _artifact: &Artifact) -> Result<(), DeviceError> {
        let appliance = self.enter(target, "upload").await?;
        if appliance.fail_upload {
            return Err(DeviceError::api(500, "disk full"));
        }
        Ok(())
    }

    async fn install(&self, target: &Target, package: &Package) -> Result<(), DeviceError> {
        let appliance = self.enter(target, "install").await?;
        if appliance.fail_install {
            return Err(DeviceError::api(400, "bad package"));
        }
        let version = package.version.clone();
        self.update(target, |a| {
            a.installed.push(agent_package(&version));
            a.version = Some(version);
            a.restarting = a.restart_reads;
            a.reachable = !a.drop_after_install;
        });
        Ok(())
    }

    async fn list_installed(&self, target: &Target) -> Result<Vec<InstalledPackage>, DeviceError> {
        let appliance = self.enter(target, "list").await?;
        if appliance.fail_list {
            return Err(DeviceError::api(503, "busy"));
        }
        Ok(appliance.installed)
    }

    async fn uninstall(
        &self,
        target: &Target,
        package: &InstalledPackage,
    ) -> Result<(), DeviceError> {
        let appliance = self.enter(target, "uninstall").await?;
        if appliance.fail_uninstall {
            return Err(DeviceError::api(500, "uninstall failed"));
        }
        let name = package.package_name.clone();
        self.update(target, |a| {
            a.installed.retain(|p| p.package_name != name);
            a.version = None;
        });
        Ok(())
    }

    async fn deploy(&self, target: &Target, declaration: &Template) -> Result<(), DeviceError> {
        let appliance = self.enter(target, "deploy").await?;
        if appliance.fail_deploy {
            return Err(DeviceError::api(422, "invalid declaration"));
        }
        self.deployed
            .lock()
            .unwrap()
            .insert(target.address().to_string(), declaration.as_bytes().to_vec());
        Ok(())
    }
}

/// A real artifact file on disk plus the package record pointing at it.
///
/// Keep the returned file alive for as long as the package is used.
pub fn package_with_artifact(version: &str) -> (NamedTempFile, Arc<Package>) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"fake rpm payload").unwrap();
    let package = Package {
        version: version.to_string(),
        filepath: file.path().display().to_string(),
        name: "f5-telemetry".to_string(),
        release: "3".to_string(),
        arch: "noarch".to_string(),
        package_name: format!("f5-telemetry-{version}-3.noarch"),
        ..Package::default()
    };
    (file, Arc::new(package))
}

/// Work item for `address` with the given package and optional template.
pub fn work_item(address: &str, package: &Arc<Package>, template: Option<&str>) -> WorkItem {
    WorkItem::new(
        Target::new(address, Credential::basic("admin:admin")),
        Arc::clone(package),
        template.map(|t| Template::new(t.as_bytes().to_vec())),
    )
}
