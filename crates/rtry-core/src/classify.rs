//! Failure classifiers: decide which failures are eligible for retry at all.

use crate::error::{Error, TransportError};
use std::fmt;
use std::sync::Arc;

/// Predicate over a failure. A list of classifiers accepts an error when any
/// one of them does; an empty list accepts nothing.
#[derive(Clone)]
pub enum FailureClassifier {
    /// `BadStatus` with exactly this code.
    Status(u16),
    /// `NetworkUnreachable`.
    NetworkError,
    /// `TimedOut`.
    Timeout,
    /// Every failure.
    All,
    /// Caller-supplied predicate.
    Predicate(Arc<dyn Fn(&Error) -> bool + Send + Sync>),
}

impl FailureClassifier {
    pub fn on_status(code: u16) -> Self {
        FailureClassifier::Status(code)
    }

    /// 401 Unauthorized: credentials missing or expired.
    pub fn on_unauthenticated_status() -> Self {
        FailureClassifier::Status(401)
    }

    /// 403 Forbidden.
    pub fn on_unauthorized_status() -> Self {
        FailureClassifier::Status(403)
    }

    pub fn on_network_error() -> Self {
        FailureClassifier::NetworkError
    }

    pub fn on_timeout() -> Self {
        FailureClassifier::Timeout
    }

    pub fn on_all_failures() -> Self {
        FailureClassifier::All
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Error) -> bool + Send + Sync + 'static,
    {
        FailureClassifier::Predicate(Arc::new(f))
    }

    /// Whether this classifier accepts `err` as retriable.
    pub fn accepts(&self, err: &Error) -> bool {
        match self {
            FailureClassifier::Status(code) => err.status() == Some(*code),
            FailureClassifier::NetworkError => {
                matches!(err, Error::Transport(TransportError::NetworkUnreachable))
            }
            FailureClassifier::Timeout => matches!(err, Error::Transport(TransportError::TimedOut)),
            FailureClassifier::All => true,
            FailureClassifier::Predicate(f) => f(err),
        }
    }
}

impl fmt::Debug for FailureClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureClassifier::Status(code) => write!(f, "Status({})", code),
            FailureClassifier::NetworkError => write!(f, "NetworkError"),
            FailureClassifier::Timeout => write!(f, "Timeout"),
            FailureClassifier::All => write!(f, "All"),
            FailureClassifier::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// True iff at least one classifier accepts `err`.
pub fn matches(classifiers: &[FailureClassifier], err: &Error) -> bool {
    classifiers.iter().any(|c| c.accepts(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> Error {
        TransportError::BadStatus(code).into()
    }

    #[test]
    fn on_status_matches_only_that_code() {
        let c = [FailureClassifier::on_status(401)];
        assert!(matches(&c, &status(401)));
        assert!(!matches(&c, &status(403)));
        assert!(!matches(&c, &TransportError::NetworkUnreachable.into()));
    }

    #[test]
    fn fixed_auth_statuses() {
        assert!(FailureClassifier::on_unauthenticated_status().accepts(&status(401)));
        assert!(FailureClassifier::on_unauthorized_status().accepts(&status(403)));
        assert!(!FailureClassifier::on_unauthorized_status().accepts(&status(401)));
    }

    #[test]
    fn network_and_timeout() {
        let net: Error = TransportError::NetworkUnreachable.into();
        let timeout: Error = TransportError::TimedOut.into();
        assert!(FailureClassifier::on_network_error().accepts(&net));
        assert!(!FailureClassifier::on_network_error().accepts(&timeout));
        assert!(FailureClassifier::on_timeout().accepts(&timeout));
        assert!(!FailureClassifier::on_timeout().accepts(&status(504)));
    }

    #[test]
    fn empty_list_matches_nothing() {
        assert!(!matches(&[], &status(500)));
        assert!(!matches(&[], &Error::custom("anything")));
    }

    #[test]
    fn list_is_logical_or() {
        let c = [
            FailureClassifier::on_timeout(),
            FailureClassifier::on_status(503),
        ];
        assert!(matches(&c, &status(503)));
        assert!(matches(&c, &TransportError::TimedOut.into()));
        assert!(!matches(&c, &status(500)));
        assert!(matches(&[FailureClassifier::on_all_failures()], &Error::custom("x")));
    }

    #[test]
    fn predicate_classifier() {
        let c = FailureClassifier::predicate(|e| matches!(e, Error::Custom(m) if m == "retry me"));
        assert!(c.accepts(&Error::custom("retry me")));
        assert!(!c.accepts(&Error::custom("no")));
        assert_eq!(format!("{:?}", c), "Predicate(..)");
    }
}
