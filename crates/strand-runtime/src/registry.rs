// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Operation registry implementing [`EffectGateway`].
//!
//! Workers register their effect handlers by name at startup; workflows only
//! ever see the gateway trait.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use tracing::debug;

use crate::effect::EffectGateway;
use crate::error::EffectError;

type EffectFuture = Pin<Box<dyn Future<Output = Result<Option<String>, EffectError>> + Send>>;
type EffectHandler = Box<dyn Fn(String) -> EffectFuture + Send + Sync>;

/// A registry of named effect handlers.
///
/// ```ignore
/// let registry = EffectRegistry::new()
///     .register("uppercase", |input| async move { Ok(Some(input.to_uppercase())) });
/// ```
#[derive(Default)]
pub struct EffectRegistry {
    handlers: HashMap<String, EffectHandler>,
}

impl EffectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `operation`, replacing any previous one.
    pub fn register<F, Fut>(mut self, operation: &str, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<String>, EffectError>> + Send + 'static,
    {
        self.handlers.insert(
            operation.to_string(),
            Box::new(move |input| Box::pin(handler(input))),
        );
        self
    }

    /// Names of all registered operations.
    pub fn operations(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

#[async_trait]
impl EffectGateway for EffectRegistry {
    async fn invoke(&self, operation: &str, input: &str) -> Result<Option<String>, EffectError> {
        let handler = self
            .handlers
            .get(operation)
            .ok_or_else(|| EffectError::UnknownOperation(operation.to_string()))?;
        debug!(operation, "invoking effect handler");
        handler(input.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_by_operation_name() {
        let registry = EffectRegistry::new()
            .register("uppercase", |input| async move {
                Ok(Some(input.to_uppercase()))
            })
            .register("reverse", |input| async move {
                Ok(Some(input.chars().rev().collect()))
            });

        assert_eq!(
            registry.invoke("uppercase", "foo").await.unwrap(),
            Some("FOO".to_string())
        );
        assert_eq!(
            registry.invoke("reverse", "abc").await.unwrap(),
            Some("cba".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let registry = EffectRegistry::new();
        let err = registry.invoke("missing", "x").await.unwrap_err();
        assert!(matches!(err, EffectError::UnknownOperation(op) if op == "missing"));
    }

    #[tokio::test]
    async fn test_handler_can_report_unsupported() {
        let registry = EffectRegistry::new()
            .register("lookup", |_input| async move { Ok(None::<String>) });
        assert_eq!(registry.invoke("lookup", "x").await.unwrap(), None);
    }

    #[test]
    fn test_operations_listing() {
        let registry = EffectRegistry::new()
            .register("a", |_| async move { Ok(None::<String>) })
            .register("b", |_| async move { Ok(None::<String>) });
        let mut ops = registry.operations();
        ops.sort_unstable();
        assert_eq!(ops, vec!["a", "b"]);
    }
}
