//! Classify database failures into retry policy error kinds.

use std::sync::Arc;

use crate::retry::catalog::TransientErrorCatalog;
use crate::retry::error::DbFailure;
use crate::retry::policy::ErrorKind;

/// Decides whether a failure is worth another attempt.
///
/// The executor only ever asks this one question, so swapping the classifier
/// is how a policy is pointed at a different backend.
pub trait TransientClassifier<E: ?Sized>: Send + Sync {
    fn is_transient(&self, error: &E) -> bool;
}

/// Classify a failure against a catalog of transient codes.
///
/// Timeout-class failures win over codes; a failure with neither a timeout
/// nor a catalogued code is `Other`.
pub fn classify<E: DbFailure + ?Sized>(catalog: &TransientErrorCatalog, e: &E) -> ErrorKind {
    if e.is_timeout() {
        return ErrorKind::Timeout;
    }
    match e.error_code() {
        Some(code) if catalog.contains(code) => ErrorKind::Transient(code),
        _ => ErrorKind::Other,
    }
}

/// Classifier backed by a [`TransientErrorCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogClassifier {
    catalog: Arc<TransientErrorCatalog>,
}

impl CatalogClassifier {
    pub fn new(catalog: TransientErrorCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &TransientErrorCatalog {
        &self.catalog
    }
}

impl Default for CatalogClassifier {
    fn default() -> Self {
        Self::new(TransientErrorCatalog::sql_server())
    }
}

impl<E: DbFailure + ?Sized> TransientClassifier<E> for CatalogClassifier {
    fn is_transient(&self, error: &E) -> bool {
        !matches!(classify(&self.catalog, error), ErrorKind::Other)
    }
}

/// Classifier from a closure.
pub struct FnClassifier<F> {
    f: F,
}

impl<F> FnClassifier<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<E: ?Sized, F> TransientClassifier<E> for FnClassifier<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn is_transient(&self, error: &E) -> bool {
        (self.f)(error)
    }
}

/// Treats every failure as permanent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTransient;

impl<E: ?Sized> TransientClassifier<E> for NeverTransient {
    fn is_transient(&self, _error: &E) -> bool {
        false
    }
}
