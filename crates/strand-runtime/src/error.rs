// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Runtime error types.

use thiserror::Error;

/// Failures raised while invoking the external effect gateway.
///
/// A transport-level failure is distinct from the semantic "not supported"
/// result, which the gateway reports as `Ok(None)`.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The invocation did not complete within the caller-supplied deadline.
    #[error("effect '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation that was invoked
        operation: String,
        /// Deadline that expired, in milliseconds
        timeout_ms: u64,
    },

    /// The gateway failed to execute the operation.
    #[error("effect '{operation}' failed: {message}")]
    Transport {
        /// Operation that was invoked
        operation: String,
        /// Gateway-reported failure message
        message: String,
    },

    /// No handler is registered for the operation.
    #[error("unknown effect operation '{0}'")]
    UnknownOperation(String),
}

/// Failures surfaced to callers of blocking mutations (updates).
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Rejected by a validator before the mutation was accepted.
    ///
    /// The caller sees an immediate rejection and no state was changed.
    #[error("update rejected: {0}")]
    Rejected(String),

    /// The mutation was accepted but ultimately failed.
    ///
    /// Acceptance of the attempt is already on record when this is raised;
    /// only the outcome failed. No state was changed.
    #[error("update failed: {0}")]
    Failed(String),
}

impl From<EffectError> for UpdateError {
    fn from(err: EffectError) -> Self {
        // Gateway transport/timeout failures inside an accepted update are
        // application-level failures, not validation rejections.
        UpdateError::Failed(err.to_string())
    }
}

/// Failures that terminate a workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// An effect invocation failed in a position the workflow cannot absorb
    #[error("effect error: {0}")]
    Effect(#[from] EffectError),

    /// Workflow state violated an internal invariant
    #[error("inconsistent workflow state: {0}")]
    Inconsistent(String),

    /// The instance was shut down before the run produced a result
    #[error("instance shut down")]
    Shutdown,

    /// The instance task failed to run to completion
    #[error("instance task failed: {0}")]
    Join(String),
}

/// Type alias for runtime results.
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_error_display() {
        let err = EffectError::Timeout {
            operation: "uppercase".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(err.to_string(), "effect 'uppercase' timed out after 5000ms");

        let err = EffectError::UnknownOperation("nope".to_string());
        assert_eq!(err.to_string(), "unknown effect operation 'nope'");
    }

    #[test]
    fn test_effect_error_folds_into_update_failure() {
        let err = EffectError::Transport {
            operation: "greeting-service".to_string(),
            message: "connection reset".to_string(),
        };
        let update_err = UpdateError::from(err);
        assert!(matches!(update_err, UpdateError::Failed(_)));
        assert!(update_err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_rejection_is_not_failure() {
        let rejected = UpdateError::Rejected("hindi is not supported".to_string());
        assert!(!matches!(rejected, UpdateError::Failed(_)));
    }
}
