//  Copyright 2026 meshcache contributors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Single-flight request coalescer (spec §3, §4.C).
//!
//! Modeled on the waiter-list pattern in `foyer-memory::cache::Cache::entry`:
//! the first caller for a key installs itself as the in-flight call and
//! broadcasts the result to every waiter that arrived while it was running.
//! Unlike `Cache::entry`, the winning call runs its future in place rather
//! than on a spawned task, so `fut` need not be `'static` -- the namespace
//! mutex is still released before the await, preserving the same
//! no-lock-held-during-load guarantee. The coalescer is deliberately not a
//! cache -- nothing survives past the call that produced it (that's the
//! `Group`'s job, one layer up).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Collapses concurrent loads for the same key into a single execution.
pub struct Coalescer<T> {
    in_flight: Mutex<HashMap<String, Vec<oneshot::Sender<T>>>>,
}

impl<T: Clone + Send + 'static> Coalescer<T> {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Ensure at most one execution of `fut` is in flight for `key` at a
    /// time. Callers that arrive while a load for `key` is running wait on
    /// that load's completion and receive the same result; the caller whose
    /// call actually started the load runs `fut` to completion itself.
    ///
    /// The key is removed from the in-flight table once the load completes
    /// and before any waiter observes the result, so the very next call
    /// re-executes `fut` rather than replaying a stale value -- the
    /// coalescer deduplicates only in time, never across calls. Cleanup runs
    /// via an RAII guard, so a panic (or cancellation) partway through `fut`
    /// still removes the key and drops every waiter's sender instead of
    /// leaving them parked forever -- the panic or cancellation then
    /// propagates to each waiter as a broken channel.
    pub async fn do_call<F>(&self, key: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        {
            let mut guard = self.in_flight.lock();
            match guard.get_mut(key) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    drop(guard);
                    // Another caller owns execution; just wait for its result.
                    return rx.await.expect("single-flight call aborted without producing a result");
                }
                None => {
                    guard.insert(key.to_string(), Vec::new());
                }
            }
        }

        let mut cleanup = CallGuard {
            coalescer: self,
            key: key.to_string(),
            result: None,
        };
        let result = fut.await;
        cleanup.result = Some(result.clone());
        result
    }
}

/// Removes `key` from the in-flight table and wakes its waiters when
/// dropped. Installed before `fut` runs so that unwinding out of `fut` --
/// panic or task cancellation -- still runs this cleanup, rather than
/// skipping straight past the hand-written cleanup that only covers the
/// non-panicking path.
struct CallGuard<'a, T: Clone> {
    coalescer: &'a Coalescer<T>,
    key: String,
    result: Option<T>,
}

impl<'a, T: Clone> Drop for CallGuard<'a, T> {
    fn drop(&mut self) {
        let waiters = {
            let mut guard = self.coalescer.in_flight.lock();
            guard.remove(&self.key).unwrap_or_default()
        };
        match self.result.take() {
            Some(result) => {
                for tx in waiters {
                    let _ = tx.send(result.clone());
                }
            }
            // fut aborted without producing a result: drop every sender so
            // waiters' `rx.await` resolves to `Err` instead of hanging.
            None => drop(waiters),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}
