//! Retry notifications.
//!
//! An observer hears about every retry before the backoff wait starts: never
//! before the first attempt, never after success, never after the final
//! failure.

use std::error::Error;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// One retry occurrence.
#[derive(Debug, Clone, Copy)]
pub struct RetryAttemptEvent<'a> {
    /// The attempt that just failed (1-based).
    pub attempt: u32,
    /// Wait before the next attempt.
    pub delay: Duration,
    /// Vendor code of the triggering failure, if it had one.
    pub error_code: Option<i32>,
    pub error: &'a (dyn Error + 'static),
}

pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, event: &RetryAttemptEvent<'_>);
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_retry(&self, _event: &RetryAttemptEvent<'_>) {}
}

/// Logs each retry as a `warn` line with structured fields.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("db")
    }
}

impl RetryObserver for TracingObserver {
    fn on_retry(&self, event: &RetryAttemptEvent<'_>) {
        let delay_ms = millis(event.delay);
        match event.error_code {
            Some(code) => tracing::warn!(
                operation = %self.operation,
                attempt = event.attempt,
                delay_ms,
                code,
                error = %event.error,
                "retrying after attempt {} in {}ms, code {}",
                event.attempt,
                delay_ms,
                code
            ),
            None => tracing::warn!(
                operation = %self.operation,
                attempt = event.attempt,
                delay_ms,
                error = %event.error,
                "retrying after attempt {} in {}ms",
                event.attempt,
                delay_ms
            ),
        }
    }
}

/// Counts retries; handy in tests and for cheap metrics.
#[derive(Debug, Default)]
pub struct StatsObserver {
    retries: AtomicU32,
    last_attempt: AtomicU32,
    last_delay_ms: AtomicU64,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    /// Attempt number carried by the most recent event (0 if none).
    pub fn last_attempt(&self) -> u32 {
        self.last_attempt.load(Ordering::SeqCst)
    }

    pub fn last_delay(&self) -> Duration {
        Duration::from_millis(self.last_delay_ms.load(Ordering::SeqCst))
    }
}

impl RetryObserver for StatsObserver {
    fn on_retry(&self, event: &RetryAttemptEvent<'_>) {
        self.retries.fetch_add(1, Ordering::SeqCst);
        self.last_attempt.store(event.attempt, Ordering::SeqCst);
        self.last_delay_ms
            .store(millis(event.delay), Ordering::SeqCst);
    }
}

/// Observer from a closure.
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&RetryAttemptEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RetryObserver for FnObserver<F>
where
    F: Fn(&RetryAttemptEvent<'_>) + Send + Sync,
{
    fn on_retry(&self, event: &RetryAttemptEvent<'_>) {
        (self.f)(event)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_retry(&self, event: &RetryAttemptEvent<'_>) {
        (**self).on_retry(event)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_retry(&self, event: &RetryAttemptEvent<'_>) {
        (**self).on_retry(event)
    }
}
