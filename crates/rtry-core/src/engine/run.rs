//! Retry loop: run an operation until it stops failing retriably or a policy says stop.

use std::future::Future;
use tokio::time::{sleep, Instant};

use super::advance::{advance_all, Gate};
use crate::classify::{self, FailureClassifier};
use crate::outcome::Outcome;
use crate::policy::Policy;

/// Runs `operation` until it produces a non-failed outcome, a failure no
/// classifier accepts, or any policy stops the chain.
///
/// Intermediate failures are never returned; the final `Failed` carries the
/// last error exactly as the operation produced it.
pub async fn run_with_retry<F, Fut, T>(
    policies: Vec<Policy>,
    classifiers: &[FailureClassifier],
    mut operation: F,
) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let started = Instant::now();
    let mut policies = policies;
    let mut attempt = 1u32;
    loop {
        let err = match operation().await {
            Outcome::Failed(err) => err,
            done => return done,
        };
        if !classify::matches(classifiers, &err) {
            tracing::debug!(attempt, "not retrying: {}", err);
            return Outcome::Failed(err);
        }
        match advance_all(&policies, started, Instant::now()) {
            Gate::Stop { policy } => {
                tracing::info!(attempt, policy, "giving up: {}", err);
                return Outcome::Failed(err);
            }
            Gate::Retry {
                policies: next,
                delay,
            } => {
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after: {}",
                    err
                );
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                policies = next;
                attempt += 1;
            }
        }
    }
}
