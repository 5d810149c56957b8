//! Pool construction. Opening the pool is itself retried.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::sync::Arc;

use crate::config::SqlRetryConfig;
use crate::retry::{CatalogClassifier, RetryObserver, RetryingExecutor, TracingObserver};

/// Executor type shared by every call on a [`RetryingPool`].
pub type PoolExecutor = RetryingExecutor<CatalogClassifier, Arc<dyn RetryObserver>>;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Build the executor described by `cfg`, logging retries under `operation`.
pub fn executor_from_config(cfg: &SqlRetryConfig, operation: &str) -> Result<PoolExecutor> {
    let policy = cfg.retry.policy()?;
    let observer: Arc<dyn RetryObserver> = Arc::new(TracingObserver::new(operation));
    Ok(RetryingExecutor::new(policy).with_observer(observer))
}

/// SQLite pool plus the executor its calls run under.
#[derive(Clone)]
pub struct RetryingPool {
    pub(crate) pool: Pool<Sqlite>,
    pub(crate) executor: PoolExecutor,
}

impl RetryingPool {
    pub fn new(pool: Pool<Sqlite>, executor: PoolExecutor) -> Self {
        Self { pool, executor }
    }

    /// Open (or create) the database file at `path`. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>, cfg: &SqlRetryConfig) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        Self::connect(&uri, cfg.database.max_connections, cfg).await
    }

    /// Open a private in-memory database (single connection).
    pub async fn open_memory(cfg: &SqlRetryConfig) -> Result<Self> {
        Self::connect("sqlite::memory:", 1, cfg).await
    }

    async fn connect(uri: &str, max_connections: u32, cfg: &SqlRetryConfig) -> Result<Self> {
        let executor = executor_from_config(cfg, "sqlite")?;
        let pool = executor
            .execute(|| {
                SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .connect(uri)
            })
            .await?;
        tracing::debug!(uri, max_connections, "sqlite pool open");
        Ok(Self { pool, executor })
    }

    /// Same pool, different retry observer.
    pub fn with_observer(self, observer: Arc<dyn RetryObserver>) -> Self {
        Self {
            pool: self.pool,
            executor: self.executor.with_observer(observer),
        }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn executor(&self) -> &PoolExecutor {
        &self.executor
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
