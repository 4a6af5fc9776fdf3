//! Outstanding work tracking and the crawl-wide stop signal
//!
//! Every crawl task holds a [`WorkGuard`] for its lifetime, so the number of
//! live tasks is always known. The same structure owns the cancellation token
//! that represents the stopping state: once cancelled it stays cancelled, and
//! tasks still queued for a fetch slot give up when it fires.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Shared view of all not-yet-completed crawl tasks
#[derive(Debug, Default)]
pub struct OutstandingWork {
    stop: CancellationToken,
    live: AtomicUsize,
    spawned: AtomicUsize,
}

impl OutstandingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new task; the task is deregistered when the guard drops
    pub fn register(self: &Arc<Self>) -> WorkGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.spawned.fetch_add(1, Ordering::SeqCst);
        WorkGuard {
            work: Arc::clone(self),
        }
    }

    /// Number of tasks registered and not yet finished
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of tasks ever registered
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Enters the stopping state and wakes every queued task. Idempotent.
    pub fn cancel_all(&self) {
        self.stop.cancel();
    }

    /// Returns true once the stopping state has been entered
    pub fn is_cancelled(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Completes when the stopping state is entered
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.stop.cancelled()
    }
}

/// Keeps one task registered in [`OutstandingWork`] while alive
#[derive(Debug)]
pub struct WorkGuard {
    work: Arc<OutstandingWork>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.work.live.fetch_sub(1, Ordering::SeqCst);
    }
}
