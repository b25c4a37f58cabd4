// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow definitions built on strand-runtime.
//!
//! Two long-lived workflow state machines:
//!
//! - [`RelayWorkflow`]: buffers inbound requests, transforms them through
//!   the `uppercase` effect, commits responses into a table readable by
//!   request id, and periodically continues as new carrying the table
//!   forward so its history stays bounded.
//! - [`GreetingWorkflow`]: a language-to-greeting mapping with read-only
//!   queries, a validated synchronous language update, a service-backed
//!   asynchronous update serialized by a handler lock, and a terminal result
//!   gated on release approval.
//!
//! The crate also ships the worker-side effect handlers
//! ([`worker_registry`]) and the client-side [`Requester`].

mod activities;
mod greeting;
mod language;
mod relay;
mod requester;

pub use activities::worker_registry;
pub use greeting::{GREETING_SERVICE_OPERATION, GREETING_SERVICE_TIMEOUT, GreetingWorkflow};
pub use language::{Language, UnknownLanguage};
pub use relay::{
    DEFAULT_CONTINUE_THRESHOLD, DRAIN_WAIT, RelayParams, RelayWorkflow, Request,
    TRANSFORM_TIMEOUT, UPPERCASE_OPERATION,
};
pub use requester::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, Requester};
