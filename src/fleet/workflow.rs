//! Per-target setup and teardown state machines
//!
//! Setup:
//! `Verify -> {SkipInstall | Upload -> Install} -> {SkipDeploy | Check -> Deploy} -> Done`
//!
//! Teardown:
//! `Query -> {Uninstall | Done}`
//!
//! Every step appends its tag to the shared [`ResultAggregator`] before the
//! next step starts; the first hard failure ends the workflow. Failures stay
//! local to the target: they are returned to the orchestrator for logging and
//! nothing else.

use std::sync::Arc;
use std::time::Duration;

use super::gate::AdmissionGate;
use super::results::{ResultAggregator, Step, StepTag};
use crate::device::{DeviceApi, InstalledPackage, Verification};
use crate::domain::{Artifact, Template, WorkItem};
use crate::error::{DeviceError, WorkflowError};

/// Verify attempts made while waiting for a freshly installed agent.
pub const READINESS_ATTEMPTS: u32 = 20;

/// Pause between readiness attempts.
pub const READINESS_INTERVAL: Duration = Duration::from_secs(1);

/// Concurrent artifact transfers allowed across the whole fleet.
pub const UPLOAD_CONCURRENCY: usize = 2;

/// How long to wait for the agent to report the requested version.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: READINESS_ATTEMPTS,
            interval: READINESS_INTERVAL,
        }
    }
}

/// State shared by every workflow of one fleet run.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub results: Arc<ResultAggregator>,
    pub upload_gate: AdmissionGate,
    pub readiness: ReadinessPolicy,
}

impl WorkflowContext {
    pub fn new(results: Arc<ResultAggregator>) -> Self {
        Self {
            results,
            upload_gate: AdmissionGate::new("upload", UPLOAD_CONCURRENCY),
            readiness: ReadinessPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupState<'t> {
    Verify,
    SkipInstall,
    Upload,
    Install,
    SkipDeploy,
    Check(&'t Template),
    Deploy(&'t Template),
    Done,
}

/// The workflow for exactly one work item.
pub struct TargetWorkflow<'a> {
    client: &'a dyn DeviceApi,
    context: &'a WorkflowContext,
    item: &'a WorkItem,
}

impl<'a> TargetWorkflow<'a> {
    pub fn new(client: &'a dyn DeviceApi, context: &'a WorkflowContext, item: &'a WorkItem) -> Self {
        Self {
            client,
            context,
            item,
        }
    }

    fn address(&self) -> &str {
        self.item.target.address()
    }

    fn record(&self, tag: StepTag) {
        self.context.results.append(self.address(), tag);
    }

    /// Record the outcome of a remote call and turn a failure into a
    /// terminal workflow error.
    fn settle<T>(&self, step: Step, result: Result<T, DeviceError>) -> Result<T, WorkflowError> {
        match result {
            Ok(value) => {
                self.record(StepTag::succeeded(step));
                Ok(value)
            }
            Err(e) => {
                self.record(StepTag::failed(step));
                Err(WorkflowError::step(step, e))
            }
        }
    }

    /// Install (if needed) and configure the agent.
    pub async fn setup(&self) -> Result<(), WorkflowError> {
        let mut state = SetupState::Verify;
        loop {
            state = match state {
                SetupState::Verify => {
                    let verification = self.verify().await?;
                    if verification.is_version(&self.item.package.version) {
                        SetupState::SkipInstall
                    } else {
                        SetupState::Upload
                    }
                }
                SetupState::SkipInstall => {
                    tracing::info!(
                        version = %self.item.package.version,
                        "agent version matches, skipping install"
                    );
                    self.record(StepTag::skipped(Step::Upload));
                    self.record(StepTag::skipped(Step::Install));
                    self.after_install()
                }
                SetupState::Upload => {
                    self.upload().await?;
                    SetupState::Install
                }
                SetupState::Install => {
                    let result = self.client.install(&self.item.target, &self.item.package).await;
                    self.settle(Step::Install, result)?;
                    tracing::info!(package = %self.item.package.label(), "package installed");
                    self.after_install()
                }
                SetupState::SkipDeploy => {
                    tracing::info!("no template configured, skipping deploy");
                    self.record(StepTag::skipped(Step::Deploy));
                    SetupState::Done
                }
                SetupState::Check(template) => {
                    self.await_readiness().await?;
                    SetupState::Deploy(template)
                }
                SetupState::Deploy(template) => {
                    self.deploy(template).await?;
                    SetupState::Done
                }
                SetupState::Done => return Ok(()),
            };
        }
    }

    fn after_install(&self) -> SetupState<'a> {
        let item: &'a WorkItem = self.item;
        match &item.template {
            Some(template) => SetupState::Check(template),
            None => SetupState::SkipDeploy,
        }
    }

    async fn verify(&self) -> Result<Verification, WorkflowError> {
        let result = self.client.verify(&self.item.target).await;
        let verification = self.settle(Step::Verify, result)?;
        match &verification {
            Verification::NotInstalled { status } => {
                tracing::info!(status, "agent not installed");
            }
            Verification::Reported(_) => {
                tracing::info!(version = ?verification.version(), "agent reports version");
            }
        }
        Ok(verification)
    }

    /// Transfer the artifact while holding an upload slot.
    async fn upload(&self) -> Result<(), WorkflowError> {
        let _slot = match self.context.upload_gate.acquire().await {
            Ok(slot) => slot,
            Err(e) => {
                self.record(StepTag::failed(Step::Upload));
                return Err(e.into());
            }
        };

        tracing::debug!(
            gate = self.context.upload_gate.name(),
            in_use = self.context.upload_gate.in_use(),
            "upload slot acquired"
        );

        let artifact = match Artifact::load(&self.item.package).await {
            Ok(artifact) => artifact,
            Err(e) => {
                self.record(StepTag::failed(Step::Upload));
                return Err(e);
            }
        };

        tracing::info!(
            file = %artifact.file_name,
            bytes = artifact.bytes.len(),
            "uploading package"
        );
        let result = self.client.upload(&self.item.target, &artifact).await;
        self.settle(Step::Upload, result)
    }

    /// Re-verify until the agent reports the requested version.
    ///
    /// Any answer from the appliance that is not the requested version means
    /// "not ready yet"; a verify that gets no usable answer ends the workflow.
    async fn await_readiness(&self) -> Result<(), WorkflowError> {
        let policy = self.context.readiness;
        let wanted = &self.item.package.version;

        for attempt in 1..=policy.attempts {
            match self.client.verify(&self.item.target).await {
                Ok(verification) if verification.is_version(wanted) => {
                    tracing::info!(attempt, "agent ready");
                    self.record(StepTag::succeeded(Step::Check));
                    return Ok(());
                }
                Ok(verification) => {
                    tracing::debug!(attempt, reported = ?verification.version(), "agent not ready yet");
                }
                Err(e) => {
                    tracing::debug!(attempt, responded = e.has_response(), "readiness check failed");
                    self.record(StepTag::failed(Step::Check));
                    return Err(WorkflowError::step(Step::Check, e));
                }
            }
            if attempt < policy.attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        self.record(StepTag::failed(Step::Check));
        Err(WorkflowError::ReadinessTimeout {
            attempts: policy.attempts,
        })
    }

    async fn deploy(&self, template: &Template) -> Result<(), WorkflowError> {
        let result = self.client.deploy(&self.item.target, template).await;
        self.settle(Step::Deploy, result)?;
        tracing::info!("declaration deployed");
        Ok(())
    }

    /// Remove the agent package if it is installed.
    pub async fn teardown(&self) -> Result<(), WorkflowError> {
        let result = self.client.list_installed(&self.item.target).await;
        let installed = self.settle(Step::Query, result)?;

        let Some(package) = self.find_agent(&installed) else {
            tracing::info!(name = %self.item.package.name, "agent package not installed, nothing to remove");
            return Ok(());
        };

        let result = self.client.uninstall(&self.item.target, package).await;
        self.settle(Step::Uninstall, result)?;
        tracing::info!(package = %package.package_name, "package uninstalled");
        Ok(())
    }

    fn find_agent<'p>(&self, installed: &'p [InstalledPackage]) -> Option<&'p InstalledPackage> {
        installed.iter().find(|p| p.name == self.item.package.name)
    }
}
