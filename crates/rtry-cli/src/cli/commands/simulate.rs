//! `rtry simulate <outcomes>` – drive a scripted operation through the configured plan.

use anyhow::{bail, Result};
use rtry_core::config::RtryConfig;
use rtry_core::{Error, Outcome, RetryContext, RetryPlan, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Parse a comma-separated outcome script, e.g. `503,timeout,ok`.
pub(crate) fn parse_outcomes(script: &str) -> Result<Vec<Outcome<String>>> {
    let outcomes = script
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_outcome)
        .collect::<Result<Vec<_>>>()?;
    if outcomes.is_empty() {
        bail!("outcome script is empty");
    }
    Ok(outcomes)
}

fn parse_outcome(token: &str) -> Result<Outcome<String>> {
    let failed = |e: TransportError| Outcome::Failed(Error::Transport(e));
    let outcome = match token {
        "ok" => Outcome::Succeeded(token.to_string()),
        "pending" => Outcome::Pending,
        "not-requested" => Outcome::NotRequested,
        "timeout" => failed(TransportError::TimedOut),
        "network" => failed(TransportError::NetworkUnreachable),
        "bad-url" => failed(TransportError::BadUrl("simulated".into())),
        "bad-body" => failed(TransportError::BadBody("simulated".into())),
        _ => {
            if let Some(msg) = token.strip_prefix("custom:") {
                Outcome::Failed(Error::custom(msg))
            } else if let Ok(code) = token.parse::<u16>() {
                failed(TransportError::BadStatus(code))
            } else {
                bail!("unknown outcome '{}'", token);
            }
        }
    };
    Ok(outcome)
}

fn describe(outcome: &Outcome<String>) -> String {
    match outcome {
        Outcome::NotRequested => "not requested".to_string(),
        Outcome::Pending => "pending".to_string(),
        Outcome::Succeeded(data) => format!("succeeded ({})", data),
        Outcome::Failed(e) => format!("failed: {}", e),
    }
}

/// Result of driving a script through a plan.
#[derive(Debug)]
pub(crate) struct Simulation {
    pub outcome: Outcome<String>,
    pub attempts: usize,
    pub elapsed: Duration,
}

/// Run `outcomes` as an operation through `plan`, printing each attempt (and
/// each suspension when `resumable`).
pub(crate) async fn simulate(
    plan: &RetryPlan,
    outcomes: &[Outcome<String>],
    resumable: bool,
) -> Simulation {
    let started = Instant::now();
    let issued = AtomicUsize::new(0);

    let operation = || {
        let i = issued.fetch_add(1, Ordering::SeqCst);
        let outcome = outcomes
            .get(i)
            .or(outcomes.last())
            .cloned()
            .unwrap_or(Outcome::NotRequested);
        println!(
            "  attempt {:>3}  +{:>7}ms  {}",
            i + 1,
            started.elapsed().as_millis(),
            describe(&outcome)
        );
        std::future::ready(outcome)
    };

    let outcome = if resumable {
        let mut ctx = plan.start(operation).await;
        loop {
            match ctx {
                RetryContext::Finished(outcome) => break outcome,
                RetryContext::Suspended(suspended) => {
                    println!(
                        "  suspended after attempt {}: {}",
                        suspended.attempts(),
                        suspended.last_error()
                    );
                    ctx = suspended
                        .resume(|err: Error| {
                            println!("  side effect for: {}", err);
                            std::future::ready(())
                        })
                        .await;
                }
            }
        }
    } else {
        plan.run(operation).await
    };

    Simulation {
        outcome,
        attempts: issued.load(Ordering::SeqCst),
        elapsed: started.elapsed(),
    }
}

pub async fn run_simulate(cfg: &RtryConfig, script: &str, resumable: bool) -> Result<()> {
    let outcomes = parse_outcomes(script)?;
    let sim = simulate(&cfg.retry.plan(), &outcomes, resumable).await;
    println!(
        "Final: {} after {} attempt(s) in {}ms",
        describe(&sim.outcome),
        sim.attempts,
        sim.elapsed.as_millis()
    );
    Ok(())
}
