//! `sqlretry query --db PATH SQL` – run a query with retry and print rows.

use anyhow::Result;
use sqlretry_core::config::SqlRetryConfig;
use sqlretry_core::pool::RetryingPool;
use sqlretry_core::retry::TracingObserver;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, ValueRef};
use std::path::Path;
use std::sync::Arc;

pub async fn run_query(cfg: &SqlRetryConfig, db: &Path, sql: &str) -> Result<()> {
    let pool = RetryingPool::open_at(db, cfg)
        .await?
        .with_observer(Arc::new(TracingObserver::new("query")));
    let rows = pool.fetch_all(sql).await;
    pool.close().await;
    let rows = rows?;

    if let Some(first) = rows.first() {
        let header: Vec<&str> = first.columns().iter().map(|c| c.name()).collect();
        println!("{}", header.join("\t"));
    }
    for row in &rows {
        println!("{}", format_row(row).join("\t"));
    }
    println!("({} row(s))", rows.len());
    Ok(())
}

fn format_row(row: &SqliteRow) -> Vec<String> {
    (0..row.len()).map(|i| format_value(row, i)).collect()
}

/// Render one cell by trying the SQLite storage classes in turn.
fn format_value(row: &SqliteRow, idx: usize) -> String {
    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return "NULL".to_string(),
        Ok(_) => {}
        Err(e) => return format!("<{e}>"),
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return v.to_string();
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return v;
    }
    match row.try_get::<Vec<u8>, _>(idx) {
        Ok(bytes) => format!("<{} bytes>", bytes.len()),
        Err(_) => "?".to_string(),
    }
}
