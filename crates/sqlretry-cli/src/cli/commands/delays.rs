//! `sqlretry delays` – print the backoff schedule of the configured policy.

use anyhow::Result;
use sqlretry_core::config::SqlRetryConfig;
use sqlretry_core::retry::RetryPolicy;

pub fn run_delays(cfg: &SqlRetryConfig) -> Result<()> {
    let policy = cfg.retry.policy()?;
    for line in schedule(&policy) {
        println!("{line}");
    }
    Ok(())
}

fn schedule<C>(policy: &RetryPolicy<C>) -> Vec<String> {
    let max = policy.max_attempts();
    let mut lines = vec![format!("max attempts: {max}")];
    if max == 1 {
        lines.push("no retries".to_string());
        return lines;
    }
    let mut total = 0u128;
    for attempt in 1..max {
        let ms = policy.next_delay(attempt).as_millis();
        total = total.saturating_add(ms);
        lines.push(format!("after attempt {attempt}: wait {ms} ms"));
    }
    lines.push(format!("worst-case total wait: {total} ms"));
    lines
}
