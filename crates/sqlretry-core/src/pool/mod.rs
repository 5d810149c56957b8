//! SQLite pool whose calls all go through the retry executor.
//!
//! Every call shape (connection checkout, execute, row fetches, scalar,
//! several result sets) rebuilds its query inside the retried closure, so a
//! retry never reuses a half-consumed statement. Only buffered reads are
//! offered; a streamed read cannot be replayed once rows have been handed out.

pub mod calls;
pub mod db;

pub use db::*;

#[cfg(test)]
mod tests;
