//! HTTPS client for the appliance management REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::{DeviceApi, InstalledPackage, TelemetryInfo, Verification};
use crate::domain::{Artifact, Package, Target, Template};
use crate::error::DeviceError;

const TELEMETRY_INFO_PATH: &str = "/mgmt/shared/telemetry/info";
const TELEMETRY_DECLARE_PATH: &str = "/mgmt/shared/telemetry/declare";
const UPLOAD_PATH: &str = "/mgmt/shared/file-transfer/uploads";
const PACKAGE_TASKS_PATH: &str = "/mgmt/shared/iapp/package-management-tasks";

/// Timeouts and task polling for [`HttpDeviceClient`].
#[derive(Debug, Clone)]
pub struct HttpDeviceConfig {
    /// Per-call timeout for ordinary requests
    pub timeout: Duration,
    /// Per-call timeout for artifact uploads
    pub upload_timeout: Duration,
    /// How many times a package-management task is read before giving up
    pub task_poll_attempts: u32,
    pub task_poll_interval: Duration,
}

impl Default for HttpDeviceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            upload_timeout: Duration::from_secs(600),
            task_poll_attempts: 10,
            task_poll_interval: Duration::from_millis(500),
        }
    }
}

/// Management API client.
///
/// Certificate validation is disabled: appliances ship self-signed
/// management certificates and the fleet tool is expected to reach them as is.
#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    client: Client,
    config: HttpDeviceConfig,
}

/// A package-management task as returned by the task endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PackageTask {
    id: String,
    status: Option<String>,
    query_response: Option<Vec<InstalledPackage>>,
    error_message: Option<String>,
}

/// What a task read tells us to do next.
#[derive(Debug, PartialEq)]
enum TaskState {
    Finished(Vec<InstalledPackage>),
    Failed(String),
    Pending,
}

impl PackageTask {
    fn state(self) -> TaskState {
        match (self.status.as_deref(), self.query_response) {
            (Some("FAILED"), _) => TaskState::Failed(
                self.error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            ),
            (Some("FINISHED") | None, Some(packages)) => TaskState::Finished(packages),
            (Some("FINISHED"), None) => TaskState::Finished(Vec::new()),
            _ => TaskState::Pending,
        }
    }
}

fn content_range(len: usize) -> String {
    format!("0-{}/{}", len.saturating_sub(1), len)
}

fn base_url(target: &Target) -> String {
    format!("https://{}", target.address())
}

impl HttpDeviceClient {
    pub fn new(config: HttpDeviceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn authorize(request: RequestBuilder, target: &Target) -> Result<RequestBuilder, DeviceError> {
        let mut value = HeaderValue::from_str(target.credential().header_value())
            .map_err(|_| DeviceError::transport("credential is not a valid header value"))?;
        value.set_sensitive(true);
        Ok(request.header(AUTHORIZATION, value))
    }

    async fn send(&self, request: RequestBuilder, target: &Target) -> Result<Response, DeviceError> {
        Ok(Self::authorize(request, target)?.send().await?)
    }

    /// Turn a non-2xx response into an API error carrying its body.
    async fn ensure_success(response: Response) -> Result<Response, DeviceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeviceError::api(status.as_u16(), body))
    }

    async fn read_task(&self, target: &Target, id: &str) -> Result<PackageTask, DeviceError> {
        let url = format!("{}{PACKAGE_TASKS_PATH}/{id}", base_url(target));
        let response = self.send(self.client.get(&url), target).await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceClient {
    async fn verify(&self, target: &Target) -> Result<Verification, DeviceError> {
        let url = format!("{}{TELEMETRY_INFO_PATH}", base_url(target));
        let response = self.send(self.client.get(&url), target).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(address = %target, status = status.as_u16(), %body, "telemetry info unavailable");
            return Ok(Verification::NotInstalled {
                status: status.as_u16(),
            });
        }

        let info: TelemetryInfo = response.json().await?;
        Ok(Verification::Reported(info))
    }

    async fn upload(&self, target: &Target, artifact: &Artifact) -> Result<(), DeviceError> {
        let url = format!("{}{UPLOAD_PATH}/{}", base_url(target), artifact.file_name);
        let request = self
            .client
            .post(&url)
            .timeout(self.config.upload_timeout)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_RANGE, content_range(artifact.bytes.len()))
            .body(artifact.bytes.clone());

        let response = self.send(request, target).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn install(&self, target: &Target, package: &Package) -> Result<(), DeviceError> {
        let url = format!("{}{PACKAGE_TASKS_PATH}", base_url(target));
        let body = json!({
            "operation": "INSTALL",
            "packageFilePath": package.remote_file_path(),
        });

        let response = self.send(self.client.post(&url).json(&body), target).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn list_installed(&self, target: &Target) -> Result<Vec<InstalledPackage>, DeviceError> {
        let url = format!("{}{PACKAGE_TASKS_PATH}", base_url(target));
        let body = json!({ "operation": "QUERY" });

        let response = self.send(self.client.post(&url).json(&body), target).await?;
        let response = Self::ensure_success(response).await?;
        let task: PackageTask = response.json().await?;
        if task.id.is_empty() {
            return Err(DeviceError::parse("query task response has no id"));
        }

        let id = task.id;
        for attempt in 1..=self.config.task_poll_attempts {
            match self.read_task(target, &id).await?.state() {
                TaskState::Finished(packages) => return Ok(packages),
                TaskState::Failed(message) => return Err(DeviceError::TaskFailed { id, message }),
                TaskState::Pending => {
                    tracing::debug!(address = %target, task = %id, attempt, "query task still running");
                    tokio::time::sleep(self.config.task_poll_interval).await;
                }
            }
        }

        Err(DeviceError::TaskFailed {
            id,
            message: format!(
                "did not finish after {} reads",
                self.config.task_poll_attempts
            ),
        })
    }

    async fn uninstall(
        &self,
        target: &Target,
        package: &InstalledPackage,
    ) -> Result<(), DeviceError> {
        let url = format!("{}{PACKAGE_TASKS_PATH}", base_url(target));
        let body = json!({
            "operation": "UNINSTALL",
            "packageName": package.package_name,
        });

        let response = self.send(self.client.post(&url).json(&body), target).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn deploy(&self, target: &Target, declaration: &Template) -> Result<(), DeviceError> {
        let url = format!("{}{TELEMETRY_DECLARE_PATH}", base_url(target));
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(declaration.as_bytes().to_vec());

        let response = self.send(request, target).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
