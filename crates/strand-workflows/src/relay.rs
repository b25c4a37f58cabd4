// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Relay workflow: durable request/response processing with history
//! truncation.
//!
//! Requests arrive over a fire-and-forget signal and are buffered FIFO. The
//! main loop drains the buffer, runs each input through the uppercase
//! effect, and commits the result into a response table that callers read by
//! request id. Once enough requests have been processed in one generation
//! and nothing is in flight, the workflow continues as new, carrying forward
//! only the response table so earlier results stay readable while the
//! execution history stays bounded.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use strand_runtime::{
    EffectGateway, GenerationRun, Result, RunOutcome, StateCell, invoke_with_timeout,
};

/// Gateway operation applying the uppercase transform.
pub const UPPERCASE_OPERATION: &str = "uppercase";

/// Completion timeout for a single transform invocation.
pub const TRANSFORM_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded wait for new requests before the loop re-checks its buffer.
pub const DRAIN_WAIT: Duration = Duration::from_secs(1);

/// Requests processed in one generation before continuing as new.
pub const DEFAULT_CONTINUE_THRESHOLD: usize = 5;

/// An inbound request. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Caller-chosen opaque unique token.
    pub id: String,
    /// Text to transform.
    pub input: String,
}

impl Request {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
        }
    }
}

/// Parameters carried across a continue-as-new boundary.
///
/// This is the entire cross-generation contract: the response table must
/// round-trip exactly, everything else starts fresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayParams {
    /// Responses committed by earlier generations.
    #[serde(default)]
    pub previous_responses: HashMap<String, String>,
    /// Zero-based generation index, for observability.
    #[serde(default)]
    pub generation: u64,
}

struct RelayState {
    buffer: VecDeque<Request>,
    responses: HashMap<String, String>,
    processed: usize,
    pending: usize,
}

/// The relay workflow instance (one generation).
pub struct RelayWorkflow {
    state: StateCell<RelayState>,
    gateway: Arc<dyn EffectGateway>,
    continue_threshold: usize,
    generation: u64,
}

impl RelayWorkflow {
    /// Create a generation from its carried parameters.
    pub fn new(params: RelayParams, gateway: Arc<dyn EffectGateway>) -> Self {
        Self::with_threshold(params, gateway, DEFAULT_CONTINUE_THRESHOLD)
    }

    /// Create a generation with a custom continue-as-new threshold.
    pub fn with_threshold(
        params: RelayParams,
        gateway: Arc<dyn EffectGateway>,
        continue_threshold: usize,
    ) -> Self {
        Self {
            state: StateCell::new(RelayState {
                buffer: VecDeque::new(),
                responses: params.previous_responses,
                processed: 0,
                pending: 0,
            }),
            gateway,
            continue_threshold,
            generation: params.generation,
        }
    }

    /// Signal: append a request to the buffer. Never blocks the caller and
    /// is safe to invoke concurrently with the drain loop.
    pub fn enqueue(&self, request: Request) {
        self.state.mutate(|s| s.buffer.push_back(request));
    }

    /// Update: idempotently record the response for a request id,
    /// overwriting any stale entry. Always acknowledges.
    pub fn record_response(&self, id: &str, result: &str) -> bool {
        self.state
            .mutate(|s| s.responses.insert(id.to_string(), result.to_string()));
        true
    }

    /// Query: the stored response for a request id, or the empty string if
    /// no result has been committed yet.
    pub fn response(&self, id: &str) -> String {
        self.state
            .read(|s| s.responses.get(id).cloned().unwrap_or_default())
    }

    /// Query: this generation's index.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pop the oldest buffered request, counting it as processed and
    /// in flight.
    fn take_next(&self) -> Option<Request> {
        self.state.mutate(|s| {
            let request = s.buffer.pop_front();
            if request.is_some() {
                s.processed += 1;
                s.pending += 1;
            }
            request
        })
    }

    async fn process(&self, request: Request) {
        match invoke_with_timeout(
            self.gateway.as_ref(),
            UPPERCASE_OPERATION,
            &request.input,
            TRANSFORM_TIMEOUT,
        )
        .await
        {
            Ok(Some(result)) => {
                self.record_response(&request.id, &result);
            }
            Ok(None) => {
                // Dropped, never retried here; the caller re-issues or the
                // gateway's own retry policy applies.
                error!(request_id = %request.id, "transform reported unsupported input, dropping request");
            }
            Err(err) => {
                error!(request_id = %request.id, %err, "transform failed, dropping request");
            }
        }
        self.state.mutate(|s| s.pending -= 1);
    }
}

#[async_trait]
impl GenerationRun for RelayWorkflow {
    type Params = RelayParams;
    type Output = ();

    async fn run(self: Arc<Self>) -> Result<RunOutcome<RelayParams, ()>> {
        info!(
            generation = self.generation,
            carried_responses = self.state.read(|s| s.responses.len()),
            "relay generation started"
        );

        loop {
            // A timeout here is acceptable; re-check and loop.
            let _ = self
                .state
                .wait_until_for(|s| !s.buffer.is_empty(), DRAIN_WAIT)
                .await;

            while let Some(request) = self.take_next() {
                self.process(request).await;
            }

            let due = self
                .state
                .read(|s| s.processed >= self.continue_threshold && s.pending == 0);
            if due {
                let (processed, responses) =
                    self.state.read(|s| (s.processed, s.responses.clone()));
                info!(
                    generation = self.generation,
                    processed, "threshold reached, continuing as new"
                );
                return Ok(RunOutcome::ContinueAsNew(RelayParams {
                    previous_responses: responses,
                    generation: self.generation + 1,
                }));
            }
        }
    }
}
