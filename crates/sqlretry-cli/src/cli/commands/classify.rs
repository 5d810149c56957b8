//! `sqlretry classify <code>` – report whether a vendor code would be retried.

use sqlretry_core::config::{CatalogName, SqlRetryConfig};
use sqlretry_core::retry::TransientErrorCatalog;

use super::resolve_catalog;

pub fn run_classify(cfg: &SqlRetryConfig, code: i32, catalog: Option<CatalogName>) {
    let catalog = resolve_catalog(cfg, catalog);
    println!("{}", describe(&catalog, code));
}

fn describe(catalog: &TransientErrorCatalog, code: i32) -> String {
    if catalog.contains(code) {
        format!("{code}: transient (retried)")
    } else {
        format!("{code}: permanent (not retried)")
    }
}
