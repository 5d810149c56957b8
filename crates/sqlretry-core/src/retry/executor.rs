//! Async retry loop: run an operation until it succeeds, fails permanently,
//! or runs out of attempts.

use std::error::Error;
use std::future::Future;

use crate::retry::abort::AbortToken;
use crate::retry::classify::{CatalogClassifier, TransientClassifier};
use crate::retry::error::DbFailure;
use crate::retry::observer::{NoOpObserver, RetryAttemptEvent, RetryObserver};
use crate::retry::policy::{RetryDecision, RetryPolicy};

/// Wraps any database call with a [`RetryPolicy`].
///
/// The executor is agnostic to call shape: a row fetch, a scalar, a row
/// count, or several result sets are all just `Result<T, E>`. The error handed
/// back on failure is always the last attempt's own error.
#[derive(Debug, Clone)]
pub struct RetryingExecutor<C = CatalogClassifier, O = NoOpObserver> {
    policy: RetryPolicy<C>,
    observer: O,
}

impl Default for RetryingExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<C> RetryingExecutor<C, NoOpObserver> {
    pub fn new(policy: RetryPolicy<C>) -> Self {
        Self {
            policy,
            observer: NoOpObserver,
        }
    }
}

impl<C, O> RetryingExecutor<C, O> {
    /// Replace the observer notified before each retry.
    pub fn with_observer<O2>(self, observer: O2) -> RetryingExecutor<C, O2> {
        RetryingExecutor {
            policy: self.policy,
            observer,
        }
    }

    pub fn policy(&self) -> &RetryPolicy<C> {
        &self.policy
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<C, O: RetryObserver> RetryingExecutor<C, O> {
    /// Run `op` with retry.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + DbFailure + 'static,
        C: TransientClassifier<E>,
    {
        run_attempts(&self.policy, &self.observer, None, op).await
    }

    /// Run `op` with retry, stopping between attempts once `abort` is set.
    ///
    /// When aborted, the last attempt's error is returned and no further
    /// attempt or wait is started.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        abort: &AbortToken,
        op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + DbFailure + 'static,
        C: TransientClassifier<E>,
    {
        run_attempts(&self.policy, &self.observer, Some(abort), op).await
    }

    /// Blocking form of [`execute`](Self::execute); sleeps the calling thread
    /// during backoff. Do not call from inside an async runtime.
    pub fn execute_blocking<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Error + DbFailure + 'static,
        C: TransientClassifier<E>,
    {
        super::run::run_blocking(&self.policy, &self.observer, op)
    }
}

/// Run `op` with retry under `policy`, without an observer.
pub async fn retry_with_policy<C, T, E, F, Fut>(policy: &RetryPolicy<C>, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Error + DbFailure + 'static,
    C: TransientClassifier<E>,
{
    run_attempts(policy, &NoOpObserver, None, op).await
}

pub(crate) fn notify<E>(
    observer: &dyn RetryObserver,
    attempt: u32,
    delay: std::time::Duration,
    e: &E,
) where
    E: Error + DbFailure + 'static,
{
    observer.on_retry(&RetryAttemptEvent {
        attempt,
        delay,
        error_code: e.error_code(),
        error: e,
    });
}

pub(crate) fn log_give_up<E>(max_attempts: u32, attempt: u32, e: &E)
where
    E: Error + DbFailure,
{
    tracing::debug!(
        attempt,
        max_attempts,
        code = ?e.error_code(),
        "not retrying: {}",
        e
    );
}

async fn run_attempts<C, O, T, E, F, Fut>(
    policy: &RetryPolicy<C>,
    observer: &O,
    abort: Option<&AbortToken>,
    mut op: F,
) -> Result<T, E>
where
    O: RetryObserver,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Error + DbFailure + 'static,
    C: TransientClassifier<E>,
{
    let mut attempt = 1u32;
    loop {
        let e = match op().await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        let delay = match policy.decide(attempt, &e) {
            RetryDecision::NoRetry => {
                log_give_up(policy.max_attempts(), attempt, &e);
                return Err(e);
            }
            RetryDecision::RetryAfter(d) => d,
        };
        if abort.is_some_and(AbortToken::is_aborted) {
            tracing::debug!(attempt, "retry aborted before backoff");
            return Err(e);
        }
        notify(observer, attempt, delay, &e);
        let resumed = match abort {
            Some(token) => token.sleep(delay).await,
            None => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                true
            }
        };
        if !resumed {
            tracing::debug!(attempt, "retry aborted during backoff");
            return Err(e);
        }
        attempt += 1;
    }
}
