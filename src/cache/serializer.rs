//! Write Serializer Module
//!
//! Single-slot FIFO queue for index updates inside one runtime. Offers no
//! protection against other processes writing the same store.

use std::future::Future;

use tokio::sync::Mutex;

// == Write Serializer ==
/// Runs submitted tasks one at a time, in submission order.
///
/// Backed by tokio's fair mutex: waiters are woken first-in first-out, and a
/// task that fails or panics releases the slot when its guard drops.
#[derive(Debug, Default)]
pub struct WriteSerializer {
    slot: Mutex<()>,
}

impl WriteSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    // == Run Exclusive ==
    /// Waits for the slot, runs `task` to completion and returns its output.
    pub async fn run_exclusive<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _slot = self.slot.lock().await;
        task().await
    }
}
