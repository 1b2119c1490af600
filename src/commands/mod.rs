//! Command implementations for tsfleet CLI

pub mod helpers;
pub mod setup;
pub mod teardown;
