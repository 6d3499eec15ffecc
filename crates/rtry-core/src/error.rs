//! Failure values carried inside [`Outcome::Failed`](crate::Outcome::Failed).

use thiserror::Error;

/// Failure reported by the transport that performed a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request target could not be built.
    #[error("bad url: {0}")]
    BadUrl(String),
    /// The request did not complete in time.
    #[error("request timed out")]
    TimedOut,
    /// DNS failure, refused connection, no route, etc.
    #[error("network unreachable")]
    NetworkUnreachable,
    /// The server answered with a non-success status.
    #[error("bad status: {0}")]
    BadStatus(u16),
    /// The response arrived but its body could not be decoded.
    #[error("bad body: {0}")]
    BadBody(String),
}

/// Error observed by failure classifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Application-level failure with a free-form message.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }

    /// HTTP status carried by a `BadStatus` transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(TransportError::BadStatus(code)) => Some(*code),
            _ => None,
        }
    }
}

/// Returned when a retry chain is resumed after it already produced its final outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResumeError {
    #[error("retry chain already finished; a context can only be resumed while suspended")]
    AlreadyFinished,
}
