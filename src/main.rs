//! tsfleet - telemetry agent fleet tool
//!
//! Installs, configures or removes the telemetry streaming agent on a fleet of
//! appliances over their management REST API, a bounded number of appliances
//! at a time, and prints a per-appliance outcome summary.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod device;
mod domain;
mod error;
mod fleet;
mod progress;
#[cfg(test)]
mod test_fixtures;
mod ui;

use cli::Cli;
use error::{FleetError, Result};

/// Log filter used when `RUST_LOG` is not set
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,tsfleet=debug"
    } else {
        "warn,tsfleet=info"
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| FleetError::RuntimeFailed {
            reason: e.to_string(),
        })?;

    runtime.block_on(async {
        if cli.teardown {
            commands::teardown::run(cli).await
        } else {
            commands::setup::run(cli).await
        }
    })
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
