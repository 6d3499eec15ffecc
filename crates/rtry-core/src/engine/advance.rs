//! Policy gate shared by both engines.

use std::time::Duration;
use tokio::time::Instant;

use crate::policy::{Policy, Step};

/// Combined decision of every policy for one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// All policies continue: wait `delay`, then retry with `policies`.
    Retry { policies: Vec<Policy>, delay: Duration },
    /// The named policy vetoed further attempts.
    Stop { policy: &'static str },
}

/// Step every policy against the same `now`.
///
/// Policies are independent, so their delays overlap: the wait before the
/// next attempt is the longest delay requested, not the sum. Any `Stop` wins
/// regardless of position; successors keep the input order.
pub fn advance_all(policies: &[Policy], started: Instant, now: Instant) -> Gate {
    let mut next = Vec::with_capacity(policies.len());
    let mut delay = Duration::ZERO;
    for policy in policies {
        match policy.step(started, now) {
            Step::Continue { next: successor, delay: d } => {
                delay = delay.max(d);
                next.push(successor);
            }
            Step::Stop => {
                return Gate::Stop {
                    policy: policy.name(),
                }
            }
        }
    }
    Gate::Retry {
        policies: next,
        delay,
    }
}
