//! Cooperative abort for retry loops.
//!
//! The flag is checked between attempts; an attempt already running is left
//! to finish on its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    aborted: AtomicBool,
    notify: Notify,
}

/// Shared abort flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct AbortToken {
    inner: Arc<Inner>,
}

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort; wakes any retry loop currently in a backoff wait.
    pub fn abort(&self) {
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    /// Sleep for `delay` unless aborted first. Returns false if aborted.
    pub(crate) async fn sleep(&self, delay: Duration) -> bool {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before re-checking the flag so an abort between the two
        // cannot be missed.
        notified.as_mut().enable();
        if self.is_aborted() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.is_aborted(),
            _ = &mut notified => false,
        }
    }
}
