//! Configuration file handling for tsfleet
//!
//! This module contains the data structures for `ts-settings.json`, the
//! settings file listing schedules, package records and declaration templates,
//! and its expansion into per-target work items.

pub mod settings;

pub use settings::{DEFAULT_SETTINGS_FILE, Settings};
