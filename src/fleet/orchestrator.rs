//! Fleet dispatch
//!
//! One task per work item, all spawned up front. Each task waits at the fleet
//! admission gate and keeps its slot until its workflow returns, so at most
//! `concurrency` workflows are ever executing remote calls at once. The run
//! ends only after every task has finished.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use super::gate::AdmissionGate;
use super::results::{ResultAggregator, StepTag};
use super::workflow::{TargetWorkflow, WorkflowContext};
use crate::device::DeviceApi;
use crate::domain::WorkItem;
use crate::progress::FleetProgress;

/// Which workflow every target runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Setup,
    Teardown,
}

/// Dispatches target workflows under a shared concurrency cap.
pub struct FleetOrchestrator {
    client: Arc<dyn DeviceApi>,
    gate: AdmissionGate,
}

impl FleetOrchestrator {
    pub fn new(client: Arc<dyn DeviceApi>, concurrency: usize) -> Self {
        Self {
            client,
            gate: AdmissionGate::new("fleet", concurrency),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.gate.capacity()
    }

    /// Run `mode` against every item and wait for all of them.
    pub async fn run(&self, items: Vec<WorkItem>, mode: Mode, progress: &FleetProgress) -> FleetReport {
        let results = Arc::new(ResultAggregator::new());
        let context = WorkflowContext::new(Arc::clone(&results));
        let order = first_seen_addresses(&items);

        tracing::info!(
            targets = items.len(),
            concurrency = self.gate.capacity(),
            ?mode,
            "dispatching fleet"
        );

        let mut tasks = JoinSet::new();
        for item in items {
            let client = Arc::clone(&self.client);
            let gate = self.gate.clone();
            let context = context.clone();
            let progress = progress.clone();
            let span = tracing::info_span!("workflow", address = %item.target);

            tasks.spawn(
                async move {
                    let _slot = match gate.acquire().await {
                        Ok(slot) => slot,
                        Err(e) => {
                            tracing::error!(error = %e, "workflow not admitted");
                            progress.finish_target(item.target.address());
                            return;
                        }
                    };

                    let workflow = TargetWorkflow::new(client.as_ref(), &context, &item);
                    let outcome = match mode {
                        Mode::Setup => workflow.setup().await,
                        Mode::Teardown => workflow.teardown().await,
                    };
                    match outcome {
                        Ok(()) => tracing::info!("workflow finished"),
                        Err(e) => tracing::error!(error = %e, "workflow failed"),
                    }
                    progress.finish_target(item.target.address());
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "workflow task ended abnormally");
            }
        }

        FleetReport::new(order, results.snapshot())
    }
}

fn first_seen_addresses(items: &[WorkItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| item.target.address())
        .filter(|address| seen.insert(*address))
        .map(str::to_string)
        .collect()
}

/// Per-target outcome of a finished fleet run.
#[derive(Debug, Clone, Default)]
pub struct FleetReport {
    order: Vec<String>,
    results: HashMap<String, Vec<StepTag>>,
}

impl FleetReport {
    pub fn new(order: Vec<String>, results: HashMap<String, Vec<StepTag>>) -> Self {
        Self { order, results }
    }

    /// Every target address with its tags, in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[StepTag])> {
        self.order.iter().map(|address| {
            let tags = self.results.get(address).map_or(&[][..], Vec::as_slice);
            (address.as_str(), tags)
        })
    }

    #[cfg(test)]
    pub fn tags(&self, address: &str) -> &[StepTag] {
        self.results.get(address).map_or(&[][..], Vec::as_slice)
    }

    /// Targets with a failed step, or with no recorded step at all.
    pub fn failed(&self) -> usize {
        self.entries()
            .filter(|(_, tags)| tags.is_empty() || tags.iter().any(StepTag::is_failure))
            .count()
    }

    /// Targets whose workflow recorded no failure.
    pub fn succeeded(&self) -> usize {
        self.order.len() - self.failed()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
