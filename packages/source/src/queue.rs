//! Process-wide admission control for outbound requests.
//!
//! At most `max_concurrent` tasks run at once. When a slot frees up it is
//! handed to the waiting task with the highest priority; equal priorities
//! are served in submission order. Interactive lookups use priority `1` and
//! background lookups `0`, so interactive work jumps ahead without starving
//! background work (every completion frees exactly one slot).
//!
//! There is no queue-level timeout. A task that has started runs to
//! completion; a task whose future is dropped while still waiting simply
//! gives up its place in line.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Default bound on concurrently running requests.
pub const MAX_CONCURRENT: usize = 10;

/// Priority for lookups a user is actively waiting on.
pub const PRIORITY_INTERACTIVE: i32 = 1;

/// Priority for repeat or background lookups.
pub const PRIORITY_BACKGROUND: i32 = 0;

/// Bounded priority queue of outbound requests.
#[derive(Debug)]
pub struct RequestQueue {
    max_concurrent: usize,
    state: Mutex<QueueState>,
}

#[derive(Debug, Default)]
struct QueueState {
    running: usize,
    next_seq: u64,
    waiting: BinaryHeap<Waiter>,
}

#[derive(Debug)]
struct Waiter {
    priority: i32,
    seq: u64,
    wake: oneshot::Sender<()>,
}

impl PartialEq for Waiter {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Waiter {}

impl PartialOrd for Waiter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Waiter {
    // Max-heap: higher priority first, then lower sequence number first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(MAX_CONCURRENT)
    }
}

impl RequestQueue {
    /// Creates a queue admitting at most `max_concurrent` running tasks
    /// (minimum 1).
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Runs `run` once a slot is available and returns its output.
    pub async fn add<F, Fut, T>(&self, priority: i32, run: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _slot = self.acquire(priority).await;
        run().await
    }

    /// Number of tasks currently holding a slot.
    #[must_use]
    pub fn running(&self) -> usize {
        self.lock().running
    }

    /// Number of tasks waiting for a slot.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.lock().waiting.len()
    }

    /// Configured concurrency bound.
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    async fn acquire(&self, priority: i32) -> Slot<'_> {
        let rx = {
            let mut state = self.lock();
            if state.running < self.max_concurrent {
                state.running += 1;
                return Slot { queue: self };
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            let (wake, rx) = oneshot::channel();
            state.waiting.push(Waiter {
                priority,
                seq,
                wake,
            });
            log::trace!(
                "request queued (priority={priority}, waiting={})",
                state.waiting.len()
            );
            rx
        };

        let mut pending = PendingSlot { queue: self, rx };
        // The sender stays in `waiting` until `release` hands over a slot,
        // so this only resolves with a grant.
        let _ = (&mut pending.rx).await;
        Slot { queue: self }
    }

    /// Hands the freed slot to the best waiter, or returns it to the pool.
    fn release(&self) {
        let mut state = self.lock();
        while let Some(waiter) = state.waiting.pop() {
            if waiter.wake.send(()).is_ok() {
                return;
            }
        }
        state.running = state.running.saturating_sub(1);
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held slot; releasing happens on drop.
struct Slot<'a> {
    queue: &'a RequestQueue,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.queue.release();
    }
}

/// A waiter that may be dropped before or after its grant arrives.
struct PendingSlot<'a> {
    queue: &'a RequestQueue,
    rx: oneshot::Receiver<()>,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        // A grant that arrived but was never observed must be passed on.
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            self.queue.release();
        }
    }
}
