use std::future::Future;

use super::resumable::{run_resumable, RetryContext};
use super::run::run_with_retry;
use crate::classify::FailureClassifier;
use crate::outcome::Outcome;
use crate::policy::Policy;

/// Policies and classifiers to attach to operations, usually built from config.
///
/// Every run starts from the plan's initial policies; the plan itself is never advanced.
#[derive(Debug, Clone, Default)]
pub struct RetryPlan {
    pub policies: Vec<Policy>,
    pub classifiers: Vec<FailureClassifier>,
}

impl RetryPlan {
    pub fn new(policies: Vec<Policy>, classifiers: Vec<FailureClassifier>) -> Self {
        Self {
            policies,
            classifiers,
        }
    }

    /// See [`run_with_retry`].
    pub async fn run<F, Fut, T>(&self, operation: F) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        run_with_retry(self.policies.clone(), &self.classifiers, operation).await
    }

    /// See [`run_resumable`].
    pub async fn start<F, Fut, T>(&self, operation: F) -> RetryContext<F, T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        run_resumable(self.policies.clone(), self.classifiers.clone(), operation).await
    }
}
