//! Four-state result of an asynchronous request.

use crate::error::Error;

/// Result of issuing an operation: not requested yet, in flight, succeeded or failed.
///
/// Only `Failed` is acted on by the retry engines; the other states are
/// returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    NotRequested,
    Pending,
    Succeeded(T),
    Failed(Error),
}

impl<T> Outcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    /// The error of a `Failed` outcome.
    pub fn failure(&self) -> Option<&Error> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::NotRequested => Outcome::NotRequested,
            Outcome::Pending => Outcome::Pending,
            Outcome::Succeeded(data) => Outcome::Succeeded(f(data)),
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T>
where
    E: Into<Error>,
{
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(data) => Outcome::Succeeded(data),
            Err(e) => Outcome::Failed(e.into()),
        }
    }
}
