// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client-side requester for the relay workflow.
//!
//! Wraps the fire-and-forget enqueue plus the poll-until-committed read into
//! one call. The requester targets the logical instance through its handle,
//! so a response committed before a continue-as-new stays visible after it.

use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use strand_runtime::Instance;

use crate::relay::{RelayWorkflow, Request};

/// Default number of response polls before giving up.
pub const DEFAULT_POLL_ATTEMPTS: usize = 20;

/// Default delay between response polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Sends requests to a relay instance and polls for their responses.
pub struct Requester<'a> {
    instance: &'a Instance<RelayWorkflow>,
    attempts: usize,
    poll_interval: Duration,
}

impl<'a> Requester<'a> {
    /// Create a requester with the default polling budget.
    pub fn new(instance: &'a Instance<RelayWorkflow>) -> Self {
        Self {
            instance,
            attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the polling budget.
    pub fn with_polling(mut self, attempts: usize, poll_interval: Duration) -> Self {
        self.attempts = attempts;
        self.poll_interval = poll_interval;
        self
    }

    /// Enqueue `text` for uppercasing and poll for the committed result.
    ///
    /// Returns the empty string if the polling budget is exhausted; the
    /// caller may re-issue the request.
    pub async fn request_uppercase(&self, text: &str) -> String {
        let request_id = Uuid::new_v4().to_string();
        debug!(%request_id, input = text, "sending uppercase request");
        self.instance
            .current()
            .enqueue(Request::new(request_id.clone(), text));

        for _ in 0..self.attempts {
            // Re-resolve the current generation on every poll; the response
            // table is carried across restarts.
            let response = self.instance.current().response(&request_id);
            if !response.is_empty() {
                return response;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        String::new()
    }
}
