// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Generation control: continue-as-new and the logical instance handle.
//!
//! A workflow runs as a sequence of bounded *generations*. Each generation
//! either completes with the instance's final output or requests a restart
//! with explicit carried-forward parameters, which truncates the execution
//! history while preserving committed results. Callers hold an [`Instance`]
//! that targets the logical process identity, not a specific generation, so
//! reads keep working across the restart boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{Result, WorkflowError};

/// Outcome of one bounded generation of a workflow run.
#[derive(Debug)]
pub enum RunOutcome<P, O> {
    /// The run produced the instance's final result.
    Complete(O),
    /// Terminate this generation and start a fresh one with the given
    /// parameters. Nothing else survives the boundary.
    ContinueAsNew(P),
}

/// One bounded execution of a workflow between restart boundaries.
#[async_trait]
pub trait GenerationRun: Send + Sync + 'static {
    /// Parameters carried from one generation into the next.
    type Params: Send + 'static;
    /// Final output of the instance.
    type Output: Send + 'static;

    /// Run the generation to its outcome.
    ///
    /// Returning [`RunOutcome::ContinueAsNew`] is terminal for this
    /// generation; no code of it executes afterwards.
    async fn run(self: Arc<Self>) -> Result<RunOutcome<Self::Params, Self::Output>>;
}

/// Handle to a running logical workflow instance.
///
/// The handle outlives individual generations: after a continue-as-new it
/// transparently points at the fresh generation.
pub struct Instance<W: GenerationRun> {
    current: watch::Receiver<Arc<W>>,
    shutdown: CancellationToken,
    join: JoinHandle<Result<W::Output>>,
}

/// Spawn a workflow instance, driving generations until completion.
///
/// `make` constructs a generation from its starting parameters; it is called
/// once up front and once per continue-as-new.
pub fn spawn_instance<W, F>(params: W::Params, make: F) -> Instance<W>
where
    W: GenerationRun,
    F: Fn(W::Params) -> W + Send + 'static,
{
    let first = Arc::new(make(params));
    let (tx, rx) = watch::channel(first.clone());
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();

    let join = tokio::spawn(async move {
        let mut workflow = first;
        let mut restarts: u64 = 0;
        loop {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(WorkflowError::Shutdown),
                outcome = workflow.clone().run() => outcome?,
            };
            match outcome {
                RunOutcome::Complete(output) => {
                    info!(restarts, "instance complete");
                    return Ok(output);
                }
                RunOutcome::ContinueAsNew(params) => {
                    restarts += 1;
                    info!(restarts, "continuing as new");
                    workflow = Arc::new(make(params));
                    // Publish the fresh generation; callers holding the
                    // handle keep targeting the logical instance.
                    if tx.send(workflow.clone()).is_err() {
                        // No handle left; keep running regardless.
                    }
                }
            }
        }
    });

    Instance {
        current: rx,
        shutdown,
        join,
    }
}

impl<W: GenerationRun> Instance<W> {
    /// Snapshot of the currently live generation.
    pub fn current(&self) -> Arc<W> {
        self.current.borrow().clone()
    }

    /// Suspend until the next generation is published.
    ///
    /// Returns `false` if the instance finished without another restart.
    pub async fn generation_changed(&mut self) -> bool {
        self.current.changed().await.is_ok()
    }

    /// Whether the instance task has finished (completed, failed or shut down).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Request shutdown of the instance.
    ///
    /// The current generation is abandoned at its next suspension point.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Await the instance's final output.
    pub async fn join(self) -> Result<W::Output> {
        match self.join.await {
            Ok(result) => result,
            Err(err) => Err(WorkflowError::Join(err.to_string())),
        }
    }
}
