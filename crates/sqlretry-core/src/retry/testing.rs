//! Synthetic store error for unit tests.

use std::fmt;

use super::error::DbFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreError {
    Code(i32),
    Timeout,
    /// Transport failure with no vendor code.
    Network,
}

impl StoreError {
    pub(crate) fn code(code: i32) -> Self {
        StoreError::Code(code)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Code(c) => write!(f, "server error {}", c),
            StoreError::Timeout => write!(f, "timeout expired"),
            StoreError::Network => write!(f, "network failure"),
        }
    }
}

impl std::error::Error for StoreError {}

impl DbFailure for StoreError {
    fn error_code(&self) -> Option<i32> {
        match self {
            StoreError::Code(c) => Some(*c),
            _ => None,
        }
    }

    fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout)
    }
}
