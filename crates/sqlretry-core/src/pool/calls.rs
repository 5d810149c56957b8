//! Retried call shapes on [`RetryingPool`].

use std::future::Future;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Sqlite, Transaction};

use super::db::RetryingPool;

impl RetryingPool {
    /// Check out a connection, retrying transient checkout failures.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
        self.executor.execute(|| self.pool.acquire()).await
    }

    /// Run a single statement; returns rows affected.
    pub async fn execute(&self, sql: &str) -> Result<u64, sqlx::Error> {
        self.executor
            .execute(|| async move {
                let done = sqlx::query(sql).execute(&self.pool).await?;
                Ok::<_, sqlx::Error>(done.rows_affected())
            })
            .await
    }

    /// Run one or more `;`-separated statements as a unit of work.
    ///
    /// Each attempt runs inside its own transaction and rolls back on
    /// failure, so a retry never replays statements that already took
    /// effect. The batch must not open or commit transactions itself.
    pub async fn execute_batch(&self, sql: &str) -> Result<u64, sqlx::Error> {
        self.executor
            .execute(|| async move {
                let mut tx = self.pool.begin().await?;
                let result = sqlx::raw_sql(sql).execute(&mut *tx).await;
                let done = match result {
                    Ok(done) => done,
                    Err(e) => {
                        rollback(tx).await;
                        return Err(e);
                    }
                };
                tx.commit().await?;
                Ok::<_, sqlx::Error>(done.rows_affected())
            })
            .await
    }

    pub async fn fetch_all(&self, sql: &str) -> Result<Vec<SqliteRow>, sqlx::Error> {
        self.executor
            .execute(|| sqlx::query(sql).fetch_all(&self.pool))
            .await
    }

    pub async fn fetch_optional(&self, sql: &str) -> Result<Option<SqliteRow>, sqlx::Error> {
        self.executor
            .execute(|| sqlx::query(sql).fetch_optional(&self.pool))
            .await
    }

    /// Exactly one row; `RowNotFound` is permanent and never retried.
    pub async fn fetch_one(&self, sql: &str) -> Result<SqliteRow, sqlx::Error> {
        self.executor
            .execute(|| sqlx::query(sql).fetch_one(&self.pool))
            .await
    }

    /// First column of the first row.
    pub async fn fetch_scalar<T>(&self, sql: &str) -> Result<T, sqlx::Error>
    where
        T: Send + Unpin,
        (T,): for<'r> sqlx::FromRow<'r, SqliteRow>,
    {
        self.executor
            .execute(|| sqlx::query_as::<_, (T,)>(sql).fetch_one(&self.pool))
            .await
            .map(|(v,)| v)
    }

    /// Several result sets read in one transaction, so every set comes from
    /// the same snapshot. Either every set is returned or the attempt fails
    /// as a whole and is retried from the start.
    pub async fn fetch_sets(&self, sqls: &[&str]) -> Result<Vec<Vec<SqliteRow>>, sqlx::Error> {
        self.executor
            .execute(|| async move {
                let mut tx = self.pool.begin().await?;
                let mut sets = Vec::with_capacity(sqls.len());
                for sql in sqls {
                    let result = sqlx::query(sql).fetch_all(&mut *tx).await;
                    match result {
                        Ok(rows) => sets.push(rows),
                        Err(e) => {
                            rollback(tx).await;
                            return Err(e);
                        }
                    }
                }
                tx.commit().await?;
                Ok::<_, sqlx::Error>(sets)
            })
            .await
    }

    /// Arbitrary call against the pool, e.g. a query with bound parameters.
    ///
    /// `f` is invoked once per attempt and must build its query afresh.
    pub async fn run<'a, T, F, Fut>(&'a self, mut f: F) -> Result<T, sqlx::Error>
    where
        F: FnMut(&'a Pool<Sqlite>) -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        self.executor.execute(|| f(&self.pool)).await
    }
}

/// Roll back a failed attempt right away so the connection holds no locks
/// while the executor backs off. The attempt's own error is what propagates.
async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        tracing::debug!("rollback after failed attempt: {}", e);
    }
}
