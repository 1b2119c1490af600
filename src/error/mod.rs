//! Error types and handling for tsfleet
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Two families live here and never mix:
//! - [`FleetError`]: process-level failures (configuration, bootstrap). These
//!   abort the run before any target is touched.
//! - [`DeviceError`] and [`WorkflowError`]: per-target failures. These are
//!   consumed inside a target workflow and only ever surface as `x` tags and
//!   log lines.
//!
//! Sub-modules:
//! - [`config`]: configuration error constructors
//! - [`device`]: remote call failures
//! - [`workflow`]: terminal workflow failures

pub mod config;
pub mod device;
pub mod workflow;

pub use device::DeviceError;
pub use workflow::WorkflowError;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for tsfleet bootstrap
#[derive(Error, Diagnostic, Debug)]
pub enum FleetError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(tsfleet::config::not_found),
        help("Pass the settings file with --config or run from its directory")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(tsfleet::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(
        code(tsfleet::config::parse_failed),
        help("The settings file must be a JSON object with 'schedules', 'packages' and 'templates'")
    )]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(tsfleet::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Schedule {schedule} references unknown package version '{version}'")]
    #[diagnostic(
        code(tsfleet::config::package_not_found),
        help("Add an entry for this version under 'packages'")
    )]
    PackageNotFound { schedule: usize, version: String },

    #[error("Schedule {schedule} references unknown template '{name}'")]
    #[diagnostic(
        code(tsfleet::config::template_not_found),
        help("Add an entry for this template under 'templates' or leave the key empty")
    )]
    TemplateNotFound { schedule: usize, name: String },

    // Bootstrap errors
    #[error("Failed to build HTTP client: {reason}")]
    #[diagnostic(code(tsfleet::bootstrap::client_build_failed))]
    ClientBuildFailed { reason: String },

    #[error("Failed to start async runtime: {reason}")]
    #[diagnostic(code(tsfleet::bootstrap::runtime_failed))]
    RuntimeFailed { reason: String },
}

impl From<serde_json::Error> for FleetError {
    fn from(err: serde_json::Error) -> Self {
        FleetError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, FleetError>;
