// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Advisory mutual-exclusion guard for gateway-backed handlers.
//!
//! A [`HandlerLock`] serializes handler sections that suspend on an external
//! effect, so out-of-order completions cannot interleave their state
//! transitions. It is non-reentrant and held across await points; the RAII
//! guard releases it on every exit path, success or failure.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Cloneable advisory lock gating one critical section at a time.
#[derive(Clone, Default)]
pub struct HandlerLock {
    inner: Arc<Mutex<()>>,
}

/// RAII guard for a held [`HandlerLock`].
pub struct HandlerLockGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl HandlerLock {
    /// Create a new, unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock, suspending until it is free.
    ///
    /// Waiters are granted the lock in FIFO order, which gives concurrent
    /// handler invocations a total order matching their submission order.
    pub async fn acquire(&self) -> HandlerLockGuard<'_> {
        HandlerLockGuard {
            _guard: self.inner.lock().await,
        }
    }
}
