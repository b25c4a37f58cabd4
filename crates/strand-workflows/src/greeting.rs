// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Greeting workflow: a release-gated greeting in one of several languages.
//!
//! The workflow holds a grow-only mapping of supported languages to
//! greetings and a current language selection. Callers can query the
//! mapping, approve the workflow for release, and change the selection
//! either synchronously (validated against the mapping) or through the
//! greeting service, which can translate languages not yet in local state.
//! The run only yields its result once it is approved *and* no
//! service-backed update is still in flight, so a late update cannot race
//! the terminal read.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use strand_runtime::{
    EffectGateway, GenerationRun, HandlerLock, Result, RunOutcome, StateCell, UpdateError,
    WorkflowError, invoke_with_timeout,
};

use crate::language::Language;

/// Gateway operation resolving a language to a greeting.
pub const GREETING_SERVICE_OPERATION: &str = "greeting-service";

/// Completion timeout for greeting service calls.
pub const GREETING_SERVICE_TIMEOUT: Duration = Duration::from_secs(10);

struct GreetingState {
    greetings: BTreeMap<Language, String>,
    language: Language,
    approved_for_release: bool,
    approver_name: Option<String>,
    /// Service-backed updates currently in flight.
    handlers_in_flight: usize,
}

impl GreetingState {
    fn initial() -> Self {
        let mut greetings = BTreeMap::new();
        greetings.insert(Language::Chinese, "你好，世界".to_string());
        greetings.insert(Language::English, "Hello, world".to_string());
        Self {
            greetings,
            language: Language::English,
            approved_for_release: false,
            approver_name: None,
            handlers_in_flight: 0,
        }
    }
}

/// RAII permit counting a service-backed update as in flight.
struct HandlerPermit {
    state: StateCell<GreetingState>,
}

impl HandlerPermit {
    fn enter(state: &StateCell<GreetingState>) -> Self {
        state.mutate(|s| s.handlers_in_flight += 1);
        Self {
            state: state.clone(),
        }
    }
}

impl Drop for HandlerPermit {
    fn drop(&mut self) {
        self.state.mutate(|s| s.handlers_in_flight -= 1);
    }
}

/// The greeting workflow instance.
pub struct GreetingWorkflow {
    state: StateCell<GreetingState>,
    service_lock: HandlerLock,
    gateway: Arc<dyn EffectGateway>,
}

impl GreetingWorkflow {
    /// Create a fresh workflow with the built-in default greetings.
    pub fn new(gateway: Arc<dyn EffectGateway>) -> Self {
        Self {
            state: StateCell::new(GreetingState::initial()),
            service_lock: HandlerLock::new(),
            gateway,
        }
    }

    /// Query: the declared language domain, or only the currently supported
    /// languages. Sorted either way.
    pub fn languages(&self, include_unsupported: bool) -> Vec<Language> {
        if include_unsupported {
            Language::ALL.to_vec()
        } else {
            // BTreeMap keys iterate in sorted order.
            self.state.read(|s| s.greetings.keys().copied().collect())
        }
    }

    /// Query: the current language.
    pub fn language(&self) -> Language {
        self.state.read(|s| s.language)
    }

    /// Query: who approved the release, if anyone.
    pub fn approver(&self) -> Option<String> {
        self.state.read(|s| s.approver_name.clone())
    }

    /// Signal: approve the workflow for release. Last writer wins.
    pub fn approve(&self, approver_name: &str) {
        info!(approver = approver_name, "workflow approved for release");
        self.state.mutate(|s| {
            s.approved_for_release = true;
            s.approver_name = Some(approver_name.to_string());
        });
    }

    /// Pure validator for [`set_language`](Self::set_language).
    fn validate_language(
        state: &GreetingState,
        language: Language,
    ) -> std::result::Result<(), UpdateError> {
        if state.greetings.contains_key(&language) {
            Ok(())
        } else {
            Err(UpdateError::Rejected(format!(
                "{language} is not supported"
            )))
        }
    }

    /// Update: swap the current language, returning the previous one.
    ///
    /// Validation runs before the mutation is accepted; a rejected call
    /// leaves all state untouched.
    pub fn set_language(
        &self,
        language: Language,
    ) -> std::result::Result<Language, UpdateError> {
        self.state.mutate(|s| {
            Self::validate_language(s, language)?;
            Ok(std::mem::replace(&mut s.language, language))
        })
    }

    /// Update: swap the current language, consulting the greeting service
    /// for languages not in local state.
    ///
    /// For an already supported language this behaves like
    /// [`set_language`](Self::set_language). Otherwise the service call and
    /// the mapping insertion run under the handler lock, so concurrent
    /// invocations apply strictly in submission order. A service result of
    /// "unsupported" (or a transport failure/timeout) fails the update
    /// without touching the mapping or the selection.
    pub async fn set_language_via_service(
        &self,
        language: Language,
    ) -> std::result::Result<Language, UpdateError> {
        let _in_flight = HandlerPermit::enter(&self.state);

        if !self.state.read(|s| s.greetings.contains_key(&language)) {
            let _guard = self.service_lock.acquire().await;
            debug!(%language, "consulting greeting service");
            let greeting = invoke_with_timeout(
                self.gateway.as_ref(),
                GREETING_SERVICE_OPERATION,
                language.as_str(),
                GREETING_SERVICE_TIMEOUT,
            )
            .await?;
            let greeting = greeting.ok_or_else(|| {
                UpdateError::Failed(format!("greeting service does not support {language}"))
            })?;
            self.state.mutate(|s| s.greetings.insert(language, greeting));
        }

        Ok(self
            .state
            .mutate(|s| std::mem::replace(&mut s.language, language)))
    }
}

#[async_trait]
impl GenerationRun for GreetingWorkflow {
    type Params = ();
    type Output = String;

    /// Suspend until approved and all service-backed updates have finished,
    /// then return the greeting for the current language.
    async fn run(self: Arc<Self>) -> Result<RunOutcome<(), String>> {
        self.state
            .wait_until(|s| s.approved_for_release && s.handlers_in_flight == 0)
            .await;

        let greeting = self
            .state
            .read(|s| s.greetings.get(&s.language).cloned());
        match greeting {
            Some(greeting) => Ok(RunOutcome::Complete(greeting)),
            None => Err(WorkflowError::Inconsistent(format!(
                "current language {} has no greeting",
                self.language()
            ))),
        }
    }
}
