//! What the classifier needs to know about a failed database call.

use std::io;

/// Error raised by a data-access operation, as seen by retry classification.
///
/// Implementors expose the vendor's numeric error code (if the failure came
/// from the server) and whether the failure is timeout-class.
pub trait DbFailure {
    /// Vendor-specific numeric error code, if any.
    fn error_code(&self) -> Option<i32>;

    /// True for timeouts; these are transient regardless of code.
    fn is_timeout(&self) -> bool;
}

impl DbFailure for sqlx::Error {
    fn error_code(&self) -> Option<i32> {
        match self {
            sqlx::Error::Database(db) => db.code().and_then(|c| c.parse::<i32>().ok()),
            _ => None,
        }
    }

    fn is_timeout(&self) -> bool {
        match self {
            sqlx::Error::PoolTimedOut => true,
            sqlx::Error::Io(e) => e.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

impl DbFailure for io::Error {
    fn error_code(&self) -> Option<i32> {
        None
    }

    fn is_timeout(&self) -> bool {
        self.kind() == io::ErrorKind::TimedOut
    }
}

impl<T: DbFailure + ?Sized> DbFailure for Box<T> {
    fn error_code(&self) -> Option<i32> {
        (**self).error_code()
    }

    fn is_timeout(&self) -> bool {
        (**self).is_timeout()
    }
}
