//! Teardown command implementation
//!
//! Removes the agent package from every target that has it installed.

use crate::cli::Cli;
use crate::error::Result;
use crate::fleet::Mode;

use super::helpers;

/// Run teardown command
pub async fn run(cli: &Cli) -> Result<()> {
    helpers::run_fleet(cli, Mode::Teardown).await
}
