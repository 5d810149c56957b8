//! `sqlretry exec --db PATH SQL` – run statements with retry.

use anyhow::Result;
use sqlretry_core::config::SqlRetryConfig;
use sqlretry_core::pool::RetryingPool;
use sqlretry_core::retry::TracingObserver;
use std::path::Path;
use std::sync::Arc;

pub async fn run_exec(cfg: &SqlRetryConfig, db: &Path, sql: &str) -> Result<()> {
    let pool = RetryingPool::open_at(db, cfg)
        .await?
        .with_observer(Arc::new(TracingObserver::new("exec")));
    let affected = pool.execute_batch(sql).await;
    pool.close().await;
    println!("{} row(s) affected", affected?);
    Ok(())
}
