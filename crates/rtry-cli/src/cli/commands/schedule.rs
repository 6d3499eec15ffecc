//! `rtry schedule` – print the delays an exponential backoff policy would wait.

use anyhow::{Context, Result};
use rtry_core::backoff::{Backoff, DEFAULT_SEED};
use std::time::Duration;

pub fn run_schedule(
    interval_ms: u64,
    max_interval_ms: u64,
    count: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let backoff = Backoff::with_seed(
        Duration::from_millis(interval_ms),
        Duration::from_millis(max_interval_ms),
        seed.unwrap_or(DEFAULT_SEED),
    );
    let delays: Vec<u64> = backoff
        .schedule()
        .take(count)
        .map(|d| d.as_millis() as u64)
        .collect();

    if json {
        println!("{}", serde_json::to_string(&delays).context("serialize schedule")?);
        return Ok(());
    }

    println!("  {:>5}  {:>10}  {:>10}", "Retry", "Delay(ms)", "Total(ms)");
    println!("  {}  {}  {}", "-----", "----------", "----------");
    let mut total = 0u64;
    for (i, d) in delays.iter().enumerate() {
        total = total.saturating_add(*d);
        println!("  {:>5}  {:>10}  {:>10}", i + 1, d, total);
    }
    Ok(())
}
