// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Strand Runtime - primitives for durable single-instance workflows.
//!
//! This crate provides the building blocks a long-lived logical workflow
//! process is assembled from:
//!
//! - **Effect gateway** ([`EffectGateway`], [`invoke_with_timeout`]): the
//!   contract for invoking external side effects with bounded timeouts,
//!   keeping workflow transitions pure and replayable.
//! - **Effect registry** ([`EffectRegistry`]): worker-side registration of
//!   named operation handlers behind the gateway trait.
//! - **State cell** ([`StateCell`]): exclusively owned workflow state with
//!   snapshot reads, non-suspending transitions, and cooperative
//!   wait-conditions re-evaluated after every mutation.
//! - **Handler lock** ([`HandlerLock`]): an advisory mutual-exclusion guard
//!   serializing handler sections that suspend on an external effect.
//! - **Generation control** ([`spawn_instance`], [`Instance`],
//!   [`RunOutcome`]): continue-as-new restarts with explicit carried-forward
//!   parameters, behind a handle that targets the logical instance rather
//!   than a single generation.
//!
//! # Execution model
//!
//! One instance is single-threaded and cooperative: at most one handler body
//! makes progress at a time, and suspension happens only at explicit await
//! points (the gateway, wait conditions, the handler lock). Multiple
//! instances are fully independent; they share no mutable state.
//!
//! # Example
//!
//! ```ignore
//! use strand_runtime::{spawn_instance, EffectRegistry};
//!
//! let gateway = Arc::new(EffectRegistry::new()
//!     .register("uppercase", |input| async move { Ok(Some(input.to_uppercase())) }));
//!
//! let instance = spawn_instance(params, move |p| MyWorkflow::new(p, gateway.clone()));
//! instance.current().enqueue(request);
//! ```

mod effect;
mod error;
mod generation;
mod lock;
mod registry;
mod state;

pub use effect::{EffectGateway, invoke_with_timeout};
pub use error::{EffectError, Result, UpdateError, WorkflowError};
pub use generation::{GenerationRun, Instance, RunOutcome, spawn_instance};
pub use lock::{HandlerLock, HandlerLockGuard};
pub use registry::EffectRegistry;
pub use state::StateCell;

// Re-export for trait implementors.
pub use async_trait::async_trait;
