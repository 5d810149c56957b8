//! `sqlretry config` – print the effective configuration.

use anyhow::Result;
use sqlretry_core::config::{self, SqlRetryConfig};
use std::path::Path;

pub fn run_config(cfg: &SqlRetryConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", config::to_toml_string(cfg)?);
    Ok(())
}
