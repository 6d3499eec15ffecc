//! Composable retry policies for asynchronous operations.
//!
//! An operation yields an [`Outcome`]; failures are filtered by
//! [`FailureClassifier`]s and every attached [`Policy`] must agree before the
//! operation is issued again. [`run_with_retry`] loops internally, while
//! [`run_resumable`] hands a [`RetryContext`] back to the caller after each
//! retriable failure.

pub mod config;
pub mod logging;

pub mod backoff;
pub mod classify;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod policy;

pub use backoff::Backoff;
pub use classify::{matches, FailureClassifier};
pub use engine::{run_resumable, run_with_retry, RetryContext, RetryPlan, Suspended};
pub use error::{Error, ResumeError, TransportError};
pub use outcome::Outcome;
pub use policy::{Policy, Step};
