//! Periodic fetch scheduling with backpressure and clean cancellation.
//!
//! One [`Poller`] owns one repeating fetch. Invariants:
//!
//! - the fetch runs once immediately at start, then once per interval tick
//! - at most one invocation is in flight at any instant; a tick that fires
//!   while the busy flag is set is skipped, not queued
//! - after [`Poller::stop`], no callback runs again, even for a fetch that
//!   was already in flight
//! - a failing fetch reaches `on_error` and scheduling continues; only the
//!   owner stops the poller

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use logflow_core::ApiError;

/// Handle to a running polling task. Dropping it stops the task.
#[derive(Debug)]
pub struct Poller {
    stopped: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn a polling task invoking `fetch_op` every `interval`.
    ///
    /// Results land in `on_result`, classified failures in `on_error`.
    pub fn start<T, F, Fut, R, E>(
        interval: Duration,
        mut fetch_op: F,
        mut on_result: R,
        mut on_error: E,
    ) -> Self
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        R: FnMut(T) + Send + 'static,
        E: FnMut(ApiError) + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let busy = Arc::new(AtomicBool::new(false));

        let task_stopped = stopped.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A tick elapsing during a slow fetch is dropped, not replayed
            // in a burst.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // The first tick completes immediately: no cold-start delay.
                ticker.tick().await;
                if task_stopped.load(Ordering::Acquire) {
                    break;
                }
                if busy.swap(true, Ordering::AcqRel) {
                    // In-flight request outstanding; skip this tick.
                    continue;
                }
                let outcome = fetch_op().await;
                let discarded = task_stopped.load(Ordering::Acquire);
                if !discarded {
                    match outcome {
                        Ok(value) => on_result(value),
                        Err(err) => {
                            tracing::debug!(error = %err, "poll tick failed, continuing");
                            on_error(err);
                        }
                    }
                }
                busy.store(false, Ordering::Release);
                if discarded {
                    break;
                }
            }
        });

        Self { stopped, handle }
    }

    /// Stop polling. Any in-flight result is discarded on arrival; no
    /// callback observes it.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
