//! Jittered exponential backoff sequence.
//!
//! Each step draws `r` uniformly from `[0, 1]` and computes
//! `MULTIPLIER * (lower + r * (upper - lower + 1))` in milliseconds, where
//! `lower`/`upper` are the current interval scaled by `1 -/+ RANDOMIZATION_FACTOR`.
//! The result is capped at the configured maximum.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

pub const RANDOMIZATION_FACTOR: f64 = 0.5;
pub const MULTIPLIER: f64 = 1.5;

/// Seed used by [`Backoff::new`].
pub const DEFAULT_SEED: u64 = 0;

/// Current interval of a backoff sequence plus the generator state that
/// produces the next one. Stepping never mutates `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    interval: Duration,
    max_interval: Duration,
    rng: ChaCha8Rng,
}

impl Backoff {
    pub fn new(interval: Duration, max_interval: Duration) -> Self {
        Self::with_seed(interval, max_interval, DEFAULT_SEED)
    }

    pub fn with_seed(interval: Duration, max_interval: Duration, seed: u64) -> Self {
        Self {
            interval,
            max_interval,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Delay to wait before the next attempt.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Successor with a jittered, capped interval and advanced generator state.
    /// A cap of `Duration::MAX` means no practical cap.
    pub fn successor(&self) -> Backoff {
        let mut rng = self.rng.clone();
        let r: f64 = rng.gen_range(0.0..=1.0);
        let next_ms = jitter_ms(millis(self.interval), r).min(millis(self.max_interval));
        let interval = Duration::try_from_secs_f64(next_ms.max(0.0) / 1000.0)
            .unwrap_or(self.max_interval)
            .min(self.max_interval);
        Backoff {
            interval,
            max_interval: self.max_interval,
            rng,
        }
    }

    /// Infinite iterator over the delays of this sequence, starting with the current interval.
    pub fn schedule(&self) -> Schedule {
        Schedule {
            current: self.clone(),
        }
    }
}

/// Iterator returned by [`Backoff::schedule`].
#[derive(Debug, Clone)]
pub struct Schedule {
    current: Backoff,
}

impl Iterator for Schedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.current.interval;
        self.current = self.current.successor();
        Some(delay)
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn jitter_ms(current_ms: f64, r: f64) -> f64 {
    let delta = RANDOMIZATION_FACTOR * current_ms;
    let lower = current_ms - delta;
    let upper = current_ms + delta;
    MULTIPLIER * (lower + r * (upper - lower + 1.0))
}
