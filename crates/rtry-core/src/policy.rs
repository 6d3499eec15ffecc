use std::time::Duration;
use tokio::time::Instant;

use crate::backoff::Backoff;

/// One independent stopping rule attached to a retry chain.
///
/// Policies are values: stepping a policy yields its successor and leaves the
/// original untouched, so a list of policies keeps its length and order across
/// the whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Allow this many more retries.
    MaxRetries { remaining: u32 },
    /// Stop once this much time has passed since the first attempt started.
    /// Never waits; pair it with an interval policy.
    MaxDuration { budget: Duration },
    /// Always continue after a fixed delay.
    ConstantInterval { interval: Duration },
    /// Continue after the current backoff interval, growing with jitter.
    ExponentialBackoff(Backoff),
}

/// Decision returned by [`Policy::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Retry after `delay`, replacing the policy with `next`.
    Continue { next: Policy, delay: Duration },
    /// Veto any further attempt.
    Stop,
}

impl Policy {
    pub fn max_retries(count: u32) -> Self {
        Policy::MaxRetries { remaining: count }
    }

    pub fn max_duration(budget: Duration) -> Self {
        Policy::MaxDuration { budget }
    }

    pub fn constant_interval(interval: Duration) -> Self {
        Policy::ConstantInterval { interval }
    }

    /// Jittered exponential backoff seeded with [`crate::backoff::DEFAULT_SEED`].
    pub fn exponential_backoff(interval: Duration, max_interval: Duration) -> Self {
        Policy::ExponentialBackoff(Backoff::new(interval, max_interval))
    }

    pub fn exponential_backoff_seeded(interval: Duration, max_interval: Duration, seed: u64) -> Self {
        Policy::ExponentialBackoff(Backoff::with_seed(interval, max_interval, seed))
    }

    /// Short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::MaxRetries { .. } => "max_retries",
            Policy::MaxDuration { .. } => "max_duration",
            Policy::ConstantInterval { .. } => "constant_interval",
            Policy::ExponentialBackoff(_) => "exponential_backoff",
        }
    }

    /// Transition after a retriable failure in a chain that started at `started`.
    ///
    /// `now` is read by the caller so that every policy of one failed attempt
    /// observes the same clock value.
    pub fn step(&self, started: Instant, now: Instant) -> Step {
        match self {
            Policy::MaxRetries { remaining } => {
                if *remaining == 0 {
                    Step::Stop
                } else {
                    Step::Continue {
                        next: Policy::MaxRetries {
                            remaining: remaining - 1,
                        },
                        delay: Duration::ZERO,
                    }
                }
            }
            Policy::MaxDuration { budget } => {
                if now.saturating_duration_since(started) >= *budget {
                    Step::Stop
                } else {
                    Step::Continue {
                        next: self.clone(),
                        delay: Duration::ZERO,
                    }
                }
            }
            Policy::ConstantInterval { interval } => Step::Continue {
                next: self.clone(),
                delay: *interval,
            },
            Policy::ExponentialBackoff(backoff) => Step::Continue {
                next: Policy::ExponentialBackoff(backoff.successor()),
                delay: backoff.interval(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn max_retries_counts_down_then_stops() {
        let t = Instant::now();
        let p = Policy::max_retries(2);
        let Step::Continue { next, delay } = p.step(t, t) else {
            panic!("expected continue");
        };
        assert_eq!(delay, Duration::ZERO);
        assert_eq!(next, Policy::max_retries(1));
        let Step::Continue { next, .. } = next.step(t, t) else {
            panic!("expected continue");
        };
        assert_eq!(next.step(t, t), Step::Stop);
    }

    #[test]
    fn max_retries_zero_stops_immediately() {
        let t = Instant::now();
        assert_eq!(Policy::max_retries(0).step(t, t), Step::Stop);
    }

    #[test]
    fn max_duration_compares_elapsed_against_budget() {
        let start = Instant::now();
        let p = Policy::max_duration(ms(100));
        assert_eq!(
            p.step(start, start + ms(99)),
            Step::Continue {
                next: p.clone(),
                delay: Duration::ZERO
            }
        );
        assert_eq!(p.step(start, start + ms(100)), Step::Stop);
        assert_eq!(p.step(start, start + ms(5000)), Step::Stop);
    }

    #[test]
    fn constant_interval_never_stops() {
        let t = Instant::now();
        let p = Policy::constant_interval(ms(250));
        for _ in 0..3 {
            assert_eq!(
                p.step(t, t + ms(1_000_000)),
                Step::Continue {
                    next: p.clone(),
                    delay: ms(250)
                }
            );
        }
    }

    #[test]
    fn backoff_waits_current_interval_and_advances() {
        let t = Instant::now();
        let p = Policy::exponential_backoff(ms(500), ms(3000));
        let Step::Continue { next, delay } = p.step(t, t) else {
            panic!("expected continue");
        };
        assert_eq!(delay, ms(500));
        let Policy::ExponentialBackoff(b) = &next else {
            panic!("expected backoff successor");
        };
        assert!(b.interval() <= ms(3000));
        assert_ne!(next, p);
    }
}
