use crossbeam::channel::{Receiver, Sender, unbounded};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cooperative stop signal shared between an owner and a dispatch loop.
///
/// Clones observe the same signal. Cancellation is sticky and idempotent;
/// it also wakes a loop blocked in its wait, so shutdown does not have to
/// ride out the current tick or rate-limit interval.
#[derive(Clone, Debug)]
pub struct Shutdown {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
}

impl Shutdown {
    /// Creates the signal plus the wake receiver the dispatch loop selects on.
    pub(crate) fn new() -> (Self, Receiver<()>) {
        let (wake_tx, wake_rx) = unbounded();
        let shutdown = Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
        };
        (shutdown, wake_rx)
    }

    /// Requests that the dispatch loop exit at its next iteration boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        // The loop may already have exited and dropped its receiver.
        let _ = self.wake_tx.send(());
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
