//! Explicitly clocked frame scheduler
//!
//! Frames run only when the owner calls [`ManualScheduler::run_frame`], which
//! makes it the native driver for headless rounds and the test double for
//! animation frames.

use std::cell::{Cell, RefCell};

use super::{FrameCallback, FrameScheduler};

#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Vec<(u64, FrameCallback)>>,
    next_handle: Cell<u64>,
    /// Requests left before the scheduler starts refusing
    budget: Cell<Option<u32>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `n` more requests, then refuse every one after
    pub fn refuse_after(&self, n: u32) {
        self.budget.set(Some(n));
    }

    /// Number of queued callbacks
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Dequeue everything due this frame without running it
    pub fn take_due(&self) -> Vec<FrameCallback> {
        self.queue
            .borrow_mut()
            .drain(..)
            .map(|(_, callback)| callback)
            .collect()
    }

    /// Run every callback queued before this call. Callbacks they request
    /// land on the next frame. Returns how many ran.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let due = self.take_due();
        let count = due.len();
        for callback in due {
            callback(now_ms);
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u64;

    fn request(&self, callback: FrameCallback) -> Option<u64> {
        if let Some(left) = self.budget.get() {
            if left == 0 {
                return None;
            }
            self.budget.set(Some(left - 1));
        }
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        self.queue.borrow_mut().push((handle, callback));
        Some(handle)
    }

    fn cancel(&self, handle: u64) {
        self.queue.borrow_mut().retain(|(h, _)| *h != handle);
    }
}
