//! Command helper utilities
//!
//! Both modes share the same run: load and resolve the settings file, then
//! either print the plan or drive the fleet and print the summary.

use std::sync::Arc;

use crate::cli::Cli;
use crate::config::Settings;
use crate::device::{HttpDeviceClient, HttpDeviceConfig};
use crate::domain::WorkItem;
use crate::error::{FleetError, Result};
use crate::fleet::{FleetOrchestrator, Mode};
use crate::progress::FleetProgress;
use crate::ui;

/// Load the settings file named on the command line and expand it into work items.
///
/// Any configuration problem is returned before a single target is contacted.
pub fn load_work_items(cli: &Cli) -> Result<Vec<WorkItem>> {
    let settings = Settings::load(&cli.config)?;
    let items = settings.expand()?;
    tracing::debug!(items = items.len(), "schedules expanded");
    Ok(items)
}

/// Run `mode` against every configured target.
///
/// Once dispatch starts this always completes and prints a summary; target
/// failures only show up as `x` tags and log lines.
pub async fn run_fleet(cli: &Cli, mode: Mode) -> Result<()> {
    let items = load_work_items(cli)?;
    let concurrency = usize::from(cli.concurrency);

    if cli.dry_run {
        ui::print_plan(&items, mode, concurrency);
        return Ok(());
    }

    if items.is_empty() {
        tracing::warn!(config = %cli.config.display(), "no targets configured");
    }

    let client = HttpDeviceClient::new(HttpDeviceConfig::default()).map_err(|e| {
        FleetError::ClientBuildFailed {
            reason: e.to_string(),
        }
    })?;
    let orchestrator = FleetOrchestrator::new(Arc::new(client), concurrency);

    let progress = FleetProgress::new(u64::try_from(items.len()).unwrap_or(u64::MAX));
    let report = orchestrator.run(items, mode, &progress).await;
    progress.finish();

    tracing::info!(
        ok = report.succeeded(),
        failed = report.failed(),
        concurrency = orchestrator.concurrency(),
        "fleet run complete"
    );
    ui::print_summary(&report, mode);
    Ok(())
}
