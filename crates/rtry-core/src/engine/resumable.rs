//! Resumable retry: hand control back to the caller after every retriable failure.
//!
//! The caller receives a [`RetryContext::Suspended`] holding everything needed
//! to continue the chain (start time, last error, operation, classifiers and
//! current policies). It may run its own side effect, e.g. refreshing a
//! credential, through [`Suspended::resume`], or drop the context to abandon
//! the chain. The engine keeps no reference to a context once it is returned.

use std::fmt;
use std::future::Future;
use tokio::time::{sleep, Instant};

use super::advance::{advance_all, Gate};
use crate::classify::{self, FailureClassifier};
use crate::error::{Error, ResumeError};
use crate::outcome::Outcome;
use crate::policy::Policy;

/// State of a resumable retry chain between two turns of the caller's loop.
pub enum RetryContext<F, T> {
    /// A retriable failure happened; waiting for the caller to resume.
    Suspended(Suspended<F>),
    /// The chain ended with this outcome.
    Finished(Outcome<T>),
}

/// Snapshot taken right after a retriable failure, before any delay or side effect.
pub struct Suspended<F> {
    started: Instant,
    last_error: Error,
    attempts: u32,
    operation: F,
    classifiers: Vec<FailureClassifier>,
    policies: Vec<Policy>,
}

/// Issues the first attempt of a resumable chain.
///
/// Never suspends before the operation has run once: the result is either
/// `Finished` or a `Suspended` carrying that attempt's error.
pub async fn run_resumable<F, Fut, T>(
    policies: Vec<Policy>,
    classifiers: Vec<FailureClassifier>,
    operation: F,
) -> RetryContext<F, T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    issue(operation, Instant::now(), 1, policies, classifiers).await
}

async fn issue<F, Fut, T>(
    mut operation: F,
    started: Instant,
    attempts: u32,
    policies: Vec<Policy>,
    classifiers: Vec<FailureClassifier>,
) -> RetryContext<F, T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    match operation().await {
        Outcome::Failed(err) if classify::matches(&classifiers, &err) => {
            tracing::debug!(attempt = attempts, "suspending after: {}", err);
            RetryContext::Suspended(Suspended {
                started,
                last_error: err,
                attempts,
                operation,
                classifiers,
                policies,
            })
        }
        Outcome::Failed(err) => {
            tracing::debug!(attempt = attempts, "not retrying: {}", err);
            RetryContext::Finished(Outcome::Failed(err))
        }
        done => RetryContext::Finished(done),
    }
}

impl<F> Suspended<F> {
    /// Error of the attempt that caused this suspension.
    pub fn last_error(&self) -> &Error {
        &self.last_error
    }

    /// Attempts issued so far, including the one that failed.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the first attempt of the chain started.
    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn classifiers(&self) -> &[FailureClassifier] {
        &self.classifiers
    }

    /// Advance the chain by one step.
    ///
    /// Policies decide first, exactly as [`run_with_retry`](super::run_with_retry)
    /// would at this point. On stop the chain finishes with the last error and
    /// `side_effect` is not run. Otherwise `side_effect` receives the last
    /// error and completes, the longest policy delay elapses, and the
    /// operation is issued again.
    pub async fn resume<Fut, T, S, SFut>(self, side_effect: S) -> RetryContext<F, T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
        S: FnOnce(Error) -> SFut,
        SFut: Future<Output = ()>,
    {
        let Suspended {
            started,
            last_error,
            attempts,
            operation,
            classifiers,
            policies,
        } = self;
        match advance_all(&policies, started, Instant::now()) {
            Gate::Stop { policy } => {
                tracing::info!(attempt = attempts, policy, "giving up: {}", last_error);
                RetryContext::Finished(Outcome::Failed(last_error))
            }
            Gate::Retry {
                policies: next,
                delay,
            } => {
                tracing::debug!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "resuming after: {}",
                    last_error
                );
                side_effect(last_error).await;
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                issue(operation, started, attempts + 1, next, classifiers).await
            }
        }
    }
}

impl<F, T> RetryContext<F, T> {
    pub fn is_finished(&self) -> bool {
        matches!(self, RetryContext::Finished(_))
    }

    pub fn as_suspended(&self) -> Option<&Suspended<F>> {
        match self {
            RetryContext::Suspended(s) => Some(s),
            RetryContext::Finished(_) => None,
        }
    }

    /// Final outcome, or `None` while still suspended.
    pub fn into_outcome(self) -> Option<Outcome<T>> {
        match self {
            RetryContext::Finished(outcome) => Some(outcome),
            RetryContext::Suspended(_) => None,
        }
    }

    /// Resume a suspended chain. A finished context cannot be resumed and
    /// yields [`ResumeError::AlreadyFinished`].
    pub async fn resume<Fut, S, SFut>(self, side_effect: S) -> Result<RetryContext<F, T>, ResumeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
        S: FnOnce(Error) -> SFut,
        SFut: Future<Output = ()>,
    {
        match self {
            RetryContext::Suspended(s) => Ok(s.resume(side_effect).await),
            RetryContext::Finished(_) => Err(ResumeError::AlreadyFinished),
        }
    }

    /// Keep resuming, running `side_effect` before every retry, until the chain finishes.
    pub async fn run_to_completion<Fut, S, SFut>(self, mut side_effect: S) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
        S: FnMut(Error) -> SFut,
        SFut: Future<Output = ()>,
    {
        let mut ctx = self;
        loop {
            match ctx {
                RetryContext::Finished(outcome) => return outcome,
                RetryContext::Suspended(s) => ctx = s.resume(&mut side_effect).await,
            }
        }
    }
}

impl<F> fmt::Debug for Suspended<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspended")
            .field("started", &self.started)
            .field("last_error", &self.last_error)
            .field("attempts", &self.attempts)
            .field("classifiers", &self.classifiers)
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

impl<F, T: fmt::Debug> fmt::Debug for RetryContext<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryContext::Suspended(s) => f.debug_tuple("Suspended").field(s).finish(),
            RetryContext::Finished(outcome) => f.debug_tuple("Finished").field(outcome).finish(),
        }
    }
}
