use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Count of URLs committed to the frontier whose processing has not finished
///
/// The crawl is complete exactly when this reaches zero. Cloning yields
/// another handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct PendingCounter {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    count: AtomicUsize,
    zero: Notify,
}

impl PendingCounter {
    /// Creates a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more unit of outstanding work, returning the new count
    ///
    /// Must be called before the corresponding URL becomes visible on the
    /// frontier.
    pub fn increment(&self) -> usize {
        self.inner.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Records that one unit of work finished, returning the new count
    ///
    /// Never goes below zero; an unmatched decrement is logged and ignored.
    pub fn decrement(&self) -> usize {
        match self
            .inner
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(1) => {
                self.inner.zero.notify_waiters();
                0
            }
            Ok(previous) => previous - 1,
            Err(_) => {
                tracing::error!("Pending-work counter decremented below zero");
                0
            }
        }
    }

    /// Current count
    pub fn get(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Returns a guard that decrements the counter when dropped
    ///
    /// Used by workers so a URL is counted as done even if its processing
    /// panics.
    pub fn guard(&self) -> PendingGuard {
        PendingGuard {
            counter: self.clone(),
        }
    }

    /// Waits until the count is zero
    ///
    /// Returns immediately if it already is.
    pub async fn wait_zero(&self) {
        loop {
            let notified = self.inner.zero.notified();
            tokio::pin!(notified);
            // Register before checking so a decrement in between is not missed
            notified.as_mut().enable();

            if self.get() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// Decrements the owning counter on drop
#[must_use = "dropping the guard immediately marks the work as done"]
pub struct PendingGuard {
    counter: PendingCounter,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}
