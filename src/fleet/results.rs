//! Step outcome tags and the shared per-target result record

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// A named step of a target workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Verify,
    Upload,
    Install,
    Check,
    Deploy,
    Query,
    Uninstall,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Verify => "verify",
            Step::Upload => "upload",
            Step::Install => "install",
            Step::Check => "check",
            Step::Deploy => "deploy",
            Step::Query => "query",
            Step::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// `y`
    Succeeded,
    /// `x`
    Failed,
    /// `-`: not attempted because a precondition made it unnecessary
    Skipped,
}

impl Outcome {
    pub fn symbol(self) -> char {
        match self {
            Outcome::Succeeded => 'y',
            Outcome::Failed => 'x',
            Outcome::Skipped => '-',
        }
    }
}

/// One entry of a target's result sequence, rendered as `step:y|x|-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepTag {
    pub step: Step,
    pub outcome: Outcome,
}

impl StepTag {
    pub fn new(step: Step, outcome: Outcome) -> Self {
        Self { step, outcome }
    }

    pub fn succeeded(step: Step) -> Self {
        Self::new(step, Outcome::Succeeded)
    }

    pub fn failed(step: Step) -> Self {
        Self::new(step, Outcome::Failed)
    }

    pub fn skipped(step: Step) -> Self {
        Self::new(step, Outcome::Skipped)
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

impl fmt::Display for StepTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.step, self.outcome.symbol())
    }
}

/// Concurrency-safe map from target address to its ordered step tags.
///
/// The only mutable state shared between workflows. Appends are serialized
/// under one lock; the first append for an address creates its sequence.
/// Readers only ever get copies.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<HashMap<String, Vec<StepTag>>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tag to the end of `target`'s sequence.
    pub fn append(&self, target: &str, tag: StepTag) {
        // A push never leaves the map half-written, so poisoning is harmless.
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.entry(target.to_string()).or_default().push(tag);
    }

    /// Copy of the sequence recorded for `target`, empty when none.
    #[cfg(test)]
    pub fn sequence(&self, target: &str) -> Vec<StepTag> {
        let results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.get(target).cloned().unwrap_or_default()
    }

    /// Copy of every recorded sequence.
    pub fn snapshot(&self) -> HashMap<String, Vec<StepTag>> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Render a tag sequence as `verify:y, upload:-, ...`.
#[cfg(test)]
pub fn format_sequence(tags: &[StepTag]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
