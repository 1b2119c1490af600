//! Terminal output
//!
//! - [`summary`]: the per-target result table printed after a run
//! - [`plan`]: the work plan printed by `--dry-run`

pub mod plan;
pub mod summary;

pub use plan::print_plan;
pub use summary::print_summary;
