//! Transient-fault retry for database calls.
//!
//! A [`RetryPolicy`] bounds attempts, schedules backoff, and asks a
//! [`TransientClassifier`] whether a failure is worth another try. The stock
//! classifier checks timeouts and a [`TransientErrorCatalog`] of vendor codes.
//! [`RetryingExecutor`] runs any operation under a policy and hands back the
//! last attempt's own error when it gives up.

mod abort;
mod catalog;
mod classify;
mod error;
mod executor;
mod observer;
mod policy;
mod run;

#[cfg(test)]
pub(crate) mod testing;

pub use abort::AbortToken;
pub use catalog::TransientErrorCatalog;
pub use classify::{classify, CatalogClassifier, FnClassifier, NeverTransient, TransientClassifier};
pub use error::DbFailure;
pub use executor::{retry_with_policy, RetryingExecutor};
pub use observer::{
    FnObserver, NoOpObserver, RetryAttemptEvent, RetryObserver, StatsObserver, TracingObserver,
};
pub use policy::{Backoff, ErrorKind, RetryDecision, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
pub use run::run_with_retry;
