//! Fleet orchestration engine
//!
//! - [`gate`]: bounded admission primitive
//! - [`results`]: step tags and the shared result record
//! - [`workflow`]: per-target setup and teardown state machines
//! - [`orchestrator`]: dispatch of one workflow per work item

pub mod gate;
pub mod orchestrator;
pub mod results;
pub mod workflow;

pub use gate::GateClosed;
pub use orchestrator::{FleetOrchestrator, FleetReport, Mode};
pub use results::{Outcome, Step, StepTag};
