//! Retry orchestration.
//!
//! Both engines share the same decision: a failure must be accepted by at
//! least one classifier, then every policy is stepped and all of them must
//! continue. [`run_with_retry`] waits and re-issues the operation itself;
//! [`run_resumable`] returns a [`RetryContext`] after each retriable failure
//! and the caller drives the chain with [`Suspended::resume`].
//!
//! Neither engine bounds the chain on its own: with no stopping policy and a
//! classifier that accepts the failure, the operation is retried forever.

mod advance;
mod plan;
mod resumable;
mod run;

pub use advance::{advance_all, Gate};
pub use plan::RetryPlan;
pub use resumable::{run_resumable, RetryContext, Suspended};
pub use run::run_with_retry;
