// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Observable workflow state with cooperative wait conditions.
//!
//! A [`StateCell`] is the single owner of one workflow instance's mutable
//! state. Queries read a consistent snapshot, mutations run as short
//! non-suspending transitions, and [`StateCell::wait_until`] suspends a task
//! until a predicate over the state holds, re-evaluating it after every
//! mutation instead of busy-polling.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

struct Inner<S> {
    state: Mutex<S>,
    changed: Notify,
}

/// Cheaply cloneable handle to a workflow instance's state.
pub struct StateCell<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for StateCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> StateCell<S> {
    /// Create a cell owning the given initial state.
    pub fn new(state: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                changed: Notify::new(),
            }),
        }
    }

    /// Read a consistent snapshot of the state.
    ///
    /// The closure must not suspend; it runs under the state lock.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.inner.state.lock().expect("state lock poisoned");
        f(&state)
    }

    /// Apply a transition to the state and wake all condition waiters.
    ///
    /// The closure must not suspend; it runs under the state lock.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = {
            let mut state = self.inner.state.lock().expect("state lock poisoned");
            f(&mut state)
        };
        self.inner.changed.notify_waiters();
        result
    }

    /// Suspend until `pred` holds over the state.
    ///
    /// The predicate is checked immediately and again after every mutation.
    pub async fn wait_until(&self, pred: impl Fn(&S) -> bool) {
        let notified = self.inner.changed.notified();
        tokio::pin!(notified);
        loop {
            // Register for the next notification before checking, so a
            // mutation between the check and the await cannot be missed.
            notified.as_mut().enable();
            if self.read(&pred) {
                return;
            }
            notified.as_mut().await;
            notified.set(self.inner.changed.notified());
        }
    }

    /// Bounded variant of [`wait_until`](Self::wait_until).
    ///
    /// Returns `true` if the predicate held, `false` if `timeout` elapsed
    /// first. A timeout is not an error; callers re-check and loop.
    pub async fn wait_until_for(&self, pred: impl Fn(&S) -> bool, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_until(pred))
            .await
            .is_ok()
    }
}
