//! CLI command handlers, one file per command.

mod classify;
mod codes;
mod completions;
mod config;
mod delays;
mod exec;
mod query;

pub use classify::run_classify;
pub use codes::run_codes;
pub use completions::run_completions;
pub use config::run_config;
pub use delays::run_delays;
pub use exec::run_exec;
pub use query::run_query;

use sqlretry_core::config::{CatalogName, SqlRetryConfig};
use sqlretry_core::retry::TransientErrorCatalog;

/// The catalog a command should use: an explicit built-in table, or the
/// configured one with its extra codes.
fn resolve_catalog(cfg: &SqlRetryConfig, catalog: Option<CatalogName>) -> TransientErrorCatalog {
    match catalog {
        Some(name) => name.catalog(),
        None => cfg.retry.catalog(),
    }
}
