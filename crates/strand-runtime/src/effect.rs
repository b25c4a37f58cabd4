// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! External effect gateway contract.
//!
//! Workflows never perform side effects directly. Every external operation
//! goes through an [`EffectGateway`], which keeps workflow transitions pure
//! functions of `(state, input, effect result)` and leaves retry policy to
//! the gateway implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::EffectError;

/// A gateway that executes named side-effecting operations.
///
/// `Ok(Some(output))` is a successful result, `Ok(None)` means the operation
/// completed but reported the input as unsupported/absent, and `Err` is a
/// transport-level failure. Implementations are expected to be safe to retry.
#[async_trait]
pub trait EffectGateway: Send + Sync {
    /// Execute `operation` with `input` and return its output.
    async fn invoke(&self, operation: &str, input: &str) -> Result<Option<String>, EffectError>;
}

/// Invoke an effect with a bounded completion timeout.
///
/// Expiry maps to [`EffectError::Timeout`]; the in-flight invocation is
/// dropped, so the gateway must tolerate abandoned calls.
pub async fn invoke_with_timeout(
    gateway: &dyn EffectGateway,
    operation: &str,
    input: &str,
    timeout: Duration,
) -> Result<Option<String>, EffectError> {
    match tokio::time::timeout(timeout, gateway.invoke(operation, input)).await {
        Ok(result) => result,
        Err(_) => Err(EffectError::Timeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
