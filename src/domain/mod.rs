//! Domain models for tsfleet
//!
//! Pure value objects describing what gets deployed where. Everything here is
//! immutable once built; one [`WorkItem`] drives exactly one target workflow.

pub mod package;
pub mod target;

pub use package::{Artifact, Package, Template};
pub use target::{Credential, Target};

use std::sync::Arc;

/// One unit of fleet work: a target plus what to put on it.
///
/// Items expanded from the same schedule share the package record and the
/// template bytes read-only; nothing in an item is mutated after expansion.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub target: Target,
    pub package: Arc<Package>,
    pub template: Option<Template>,
}

impl WorkItem {
    pub fn new(target: Target, package: Arc<Package>, template: Option<Template>) -> Self {
        Self {
            target,
            package,
            template,
        }
    }
}
