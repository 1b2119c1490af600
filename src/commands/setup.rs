//! Setup command implementation
//!
//! For every target: verify the agent, upload and install the package when the
//! reported version differs, wait for the agent to come back and deploy the
//! schedule's declaration.

use crate::cli::Cli;
use crate::error::Result;
use crate::fleet::Mode;

use super::helpers;

/// Run setup command
pub async fn run(cli: &Cli) -> Result<()> {
    helpers::run_fleet(cli, Mode::Setup).await
}
