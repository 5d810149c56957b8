use std::time::Duration;

use crate::retry::classify::{CatalogClassifier, TransientClassifier};

/// High-level classification of a failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (command, connect, or pool checkout).
    Timeout,
    /// Server reported a code listed in the transient catalog.
    Transient(i32),
    /// Anything else (syntax, constraint, auth, unknown codes). Not retried.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Wait schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `unit * base^attempt`, optionally capped.
    Exponential {
        base: u32,
        unit: Duration,
        max_delay: Option<Duration>,
    },
    /// Same delay before every retry.
    Fixed(Duration),
    /// Retry without waiting.
    Immediate,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::exponential(2, Duration::from_secs(1))
    }
}

impl Backoff {
    pub fn exponential(base: u32, unit: Duration) -> Self {
        Backoff::Exponential {
            base,
            unit,
            max_delay: None,
        }
    }

    /// Delay after the given 1-based attempt has failed.
    ///
    /// Saturates instead of overflowing, so the schedule stays monotonic for
    /// any attempt number.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Exponential {
                base,
                unit,
                max_delay,
            } => {
                let factor = base.checked_pow(attempt).unwrap_or(u32::MAX);
                let raw = unit.saturating_mul(factor);
                match max_delay {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            Backoff::Fixed(d) => d,
            Backoff::Immediate => Duration::ZERO,
        }
    }
}

/// Immutable retry configuration: attempt bound, backoff, and classifier.
///
/// Built once and shared read-only; cloning is cheap for the stock
/// [`CatalogClassifier`].
#[derive(Debug, Clone)]
pub struct RetryPolicy<C = CatalogClassifier> {
    max_attempts: u32,
    backoff: Backoff,
    classifier: C,
}

/// Attempts (first try included) used when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

impl Default for RetryPolicy<CatalogClassifier> {
    fn default() -> Self {
        Self::new(CatalogClassifier::default())
    }
}

impl<C> RetryPolicy<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
            classifier,
        }
    }

    /// Set the attempt bound. Zero is treated as one: the operation always
    /// runs at least once.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Same bounds and backoff, different classifier.
    pub fn with_classifier<C2>(self, classifier: C2) -> RetryPolicy<C2> {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            classifier,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Wait before the attempt that follows `attempt` (1-based).
    pub fn next_delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    pub fn is_transient<E: ?Sized>(&self, error: &E) -> bool
    where
        C: TransientClassifier<E>,
    {
        self.classifier.is_transient(error)
    }

    /// Decide what to do after `attempt` (1-based) failed with `error`.
    pub fn decide<E: ?Sized>(&self, attempt: u32, error: &E) -> RetryDecision
    where
        C: TransientClassifier<E>,
    {
        if attempt >= self.max_attempts || !self.is_transient(error) {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.next_delay(attempt))
    }
}
