//! `sqlretry codes` – list the error codes treated as transient.

use sqlretry_core::config::{CatalogName, SqlRetryConfig};

use super::resolve_catalog;

pub fn run_codes(cfg: &SqlRetryConfig, catalog: Option<CatalogName>) {
    let catalog = resolve_catalog(cfg, catalog);
    for code in catalog.iter() {
        println!("{code}");
    }
    println!("{} transient codes (timeouts are always transient)", catalog.len());
}
