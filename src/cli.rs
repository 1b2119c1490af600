//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

use crate::config::DEFAULT_SETTINGS_FILE;

/// tsfleet - telemetry agent fleet tool
///
/// Install and configure the telemetry streaming agent on every appliance
/// listed in the settings file, or remove it again.
#[derive(Parser, Debug)]
#[command(
    name = "tsfleet",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install, configure or remove the telemetry agent across a fleet of appliances",
    long_about = "tsfleet reads schedules from a settings file and, for every listed appliance, \
                  checks the installed telemetry agent, uploads and installs the requested \
                  package when needed and deploys the configured declaration. With --teardown \
                  it removes the agent package instead.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  tsfleet\n    \
                  tsfleet -c 10 -f ./prod-settings.json\n    \
                  tsfleet --dry-run\n    \
                  tsfleet -t"
)]
pub struct Cli {
    /// Uninstall the agent from every target instead of installing it
    #[arg(long, short = 't')]
    pub teardown: bool,

    /// Maximum number of appliances worked on at the same time
    #[arg(
        long,
        short = 'c',
        env = "TSFLEET_CONCURRENCY",
        default_value_t = 3,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub concurrency: u16,

    /// Settings file with schedules, packages and templates
    #[arg(
        long,
        short = 'f',
        env = "TSFLEET_CONFIG",
        value_name = "PATH",
        default_value = DEFAULT_SETTINGS_FILE
    )]
    pub config: PathBuf,

    /// Print the work plan without contacting any appliance
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
