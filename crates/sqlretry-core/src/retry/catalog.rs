//! Tables of vendor error codes that indicate a transient condition.

use std::collections::BTreeSet;

/// SQL Server / Azure SQL error numbers that are safe to retry.
const SQL_SERVER_TRANSIENT: &[i32] = &[
    // Client-side command timeout surfaced by the driver.
    -2,
    // Network and connection failures.
    2, 20, 53, 64, 121, 233, 10053, 10054, 10060, 11001,
    // Login and initialization races.
    4060, 4221, 17197, 18401, 40143, 42108, 42109,
    // Deadlock and lock timeout.
    1204, 1205, 1222,
    // Snapshot isolation update conflicts.
    3960, 3961, 3966,
    // In-memory OLTP commit dependency and validation failures.
    41301, 41302, 41305, 41325, 41839,
    // Resource governance and throttling.
    8645, 8651, 10928, 10929, 10936, 40197, 40501, 40540, 40613, 49918, 49919, 49920,
];

/// SQLite primary and extended result codes for BUSY and LOCKED.
const SQLITE_TRANSIENT: &[i32] = &[
    5,   // SQLITE_BUSY
    6,   // SQLITE_LOCKED
    261, // SQLITE_BUSY_RECOVERY
    262, // SQLITE_LOCKED_SHAREDCACHE
    517, // SQLITE_BUSY_SNAPSHOT
    773, // SQLITE_BUSY_TIMEOUT
];

/// Immutable set of vendor error codes classified as transient.
///
/// A catalog is built once and handed to a classifier; it is never changed in
/// place, so one instance can back any number of concurrent executors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientErrorCatalog {
    codes: BTreeSet<i32>,
}

impl TransientErrorCatalog {
    /// Catalog with no codes; only timeout-class errors will be retried.
    pub fn empty() -> Self {
        Self::default()
    }

    /// SQL Server / Azure SQL transient error numbers.
    pub fn sql_server() -> Self {
        Self::from_codes(SQL_SERVER_TRANSIENT.iter().copied())
    }

    /// SQLite BUSY/LOCKED result codes.
    pub fn sqlite() -> Self {
        Self::from_codes(SQLITE_TRANSIENT.iter().copied())
    }

    pub fn from_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Copy of this catalog with additional codes.
    pub fn with_codes(&self, extra: impl IntoIterator<Item = i32>) -> Self {
        let mut codes = self.codes.clone();
        codes.extend(extra);
        Self { codes }
    }

    pub fn contains(&self, code: i32) -> bool {
        self.codes.contains(&code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.codes.iter().copied()
    }
}
