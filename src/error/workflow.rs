//! Terminal failures of a single target workflow

use thiserror::Error;

use super::DeviceError;
use crate::fleet::{GateClosed, Step};

/// Why a target workflow stopped early.
///
/// Never escapes the workflow that produced it: the orchestrator logs it and
/// the failing step is already recorded as an `x` tag.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: DeviceError,
    },

    #[error("cannot read artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error("artifact {path} checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("telemetry endpoint not available after {attempts} attempts")]
    ReadinessTimeout { attempts: u32 },

    #[error(transparent)]
    Gate(#[from] GateClosed),
}

impl WorkflowError {
    pub fn step(step: Step, source: DeviceError) -> Self {
        Self::Step { step, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_names_step() {
        let err = WorkflowError::step(Step::Install, DeviceError::api(400, "bad package"));
        assert_eq!(
            err.to_string(),
            "install failed: API error: HTTP 400: bad package"
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = WorkflowError::ReadinessTimeout { attempts: 20 };
        assert!(err.to_string().contains("after 20 attempts"));
    }
}
