//! Toggle task queue
//!
//! Hand-off point between the edge-notification context and the main
//! control flow. The edge side only ever does a non-blocking enqueue; the
//! main side drains the queue and runs the toggles serially, in order.
//!
//! [`ToggleTask`] carries no data, so the queue is a pending count plus a
//! wake-up signal for the async consumer. No depth limit is enforced; the
//! count only saturates at `u32::MAX`.
//!
//! The queue is meant to live in a `static`, like the other inter-task
//! channels, so its callback can be registered with a line for the whole
//! program lifetime.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use lightup_hal::{CallbackAction, EdgeCallback};
use portable_atomic::{AtomicU32, Ordering};

use crate::toggle::ToggleTask;

/// FIFO of pending toggles
///
/// Doubles as the edge callback: registering the queue with the button
/// line makes every edge enqueue exactly one [`ToggleTask`]. Repeated edges
/// are not coalesced.
pub struct ToggleQueue<M: RawMutex> {
    pending: AtomicU32,
    ready: Signal<M, ()>,
}

impl<M: RawMutex> Default for ToggleQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ToggleQueue<M> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
            ready: Signal::new(),
        }
    }

    /// Enqueue one toggle without blocking
    ///
    /// Returns false only if the pending count is already saturated.
    pub fn schedule(&self) -> bool {
        let scheduled = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
            .is_ok();
        if scheduled {
            trace!("Toggle scheduled");
            self.ready.signal(());
        } else {
            warn!("Toggle queue saturated, edge dropped");
        }
        scheduled
    }

    /// Take the next pending toggle, if any
    pub fn try_next(&self) -> Option<ToggleTask> {
        self.pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|_| ToggleTask)
    }

    /// Wait for the next pending toggle
    pub async fn next(&self) -> ToggleTask {
        loop {
            if let Some(task) = self.try_next() {
                return task;
            }
            // Signalled by every schedule, so an edge that lands between the
            // check above and this wait is not lost
            self.ready.wait().await;
        }
    }

    /// Number of toggles waiting
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire) as usize
    }

    /// Check if no toggle is waiting
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Discard every pending toggle, returning how many were discarded
    pub fn cancel_all(&self) -> usize {
        self.pending.swap(0, Ordering::AcqRel) as usize
    }
}

impl<M: RawMutex + Sync> EdgeCallback for ToggleQueue<M> {
    fn on_edge(&self) -> CallbackAction {
        self.schedule();
        CallbackAction::Continue
    }
}
