//! Blocking retry loop: run a closure until success or policy says stop.
//!
//! There is no abort check here; a blocking caller owns its thread and stops
//! by returning a permanent error. Cooperative cancellation lives on the
//! async path ([`RetryingExecutor::execute_cancellable`]).
//!
//! [`RetryingExecutor::execute_cancellable`]: super::RetryingExecutor::execute_cancellable

use std::error::Error;

use super::classify::TransientClassifier;
use super::error::DbFailure;
use super::executor::{log_give_up, notify};
use super::observer::{NoOpObserver, RetryObserver};
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps the thread for the backoff duration then tries again.
pub fn run_with_retry<C, T, E, F>(policy: &RetryPolicy<C>, f: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Error + DbFailure + 'static,
    C: TransientClassifier<E>,
{
    run_blocking(policy, &NoOpObserver, f)
}

pub(crate) fn run_blocking<C, O, T, E, F>(
    policy: &RetryPolicy<C>,
    observer: &O,
    mut f: F,
) -> Result<T, E>
where
    O: RetryObserver,
    F: FnMut() -> Result<T, E>,
    E: Error + DbFailure + 'static,
    C: TransientClassifier<E>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, &e) {
                RetryDecision::NoRetry => {
                    log_give_up(policy.max_attempts(), attempt, &e);
                    return Err(e);
                }
                RetryDecision::RetryAfter(d) => {
                    notify(observer, attempt, d, &e);
                    if !d.is_zero() {
                        std::thread::sleep(d);
                    }
                    attempt += 1;
                }
            },
        }
    }
}
