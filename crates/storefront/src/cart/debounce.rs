//! Per-product debounce timers.
//!
//! Quantity steppers generate bursts of same-intent writes (clicking "+"
//! five times). Each product id owns one cancelable scheduled task; a new
//! change for the same product aborts and replaces the pending task, so
//! only the final value of a burst is ever sent. Different products debounce
//! independently - there is no cross-product ordering.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

use wirecrest_core::ProductId;

/// Map from product id to its pending scheduled write.
#[derive(Default)]
pub(crate) struct DebounceMap {
    timers: Mutex<HashMap<ProductId, JoinHandle<()>>>,
}

impl DebounceMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ProductId, JoinHandle<()>>> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // still usable.
        match self.timers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Schedule `work` to run after `delay`, aborting any task already
    /// scheduled for the same product.
    pub fn restart<F>(&self, product_id: ProductId, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });

        if let Some(previous) = self.lock().insert(product_id, task) {
            previous.abort();
        }
    }

    /// Abort any pending task for the product. Returns whether one was
    /// still scheduled.
    pub fn cancel(&self, product_id: ProductId) -> bool {
        self.lock().remove(&product_id).is_some_and(|task| {
            let live = !task.is_finished();
            task.abort();
            live
        })
    }

    /// Abort every pending task.
    pub fn cancel_all(&self) {
        for (_, task) in self.lock().drain() {
            task.abort();
        }
    }
}

impl Drop for DebounceMap {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
