//! Typed outcomes for trust operations.
//!
//! Every failure is scoped to the single operation that produced it and is
//! returned synchronously; nothing here is retried internally and none of
//! these conditions are fatal to the process. A rate-limit rejection is
//! ordinary control flow that only becomes an [`Error`] when a caller asks
//! for `Result` shape via [`Decision::into_result`].
//!
//! [`Decision::into_result`]: crate::application::limiter::Decision::into_result

use std::fmt;

use crate::domain::window::LimitScope;

/// Result alias for trust operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The business-rule conflict behind a [`Error::Conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The caller tried to vote on an entity they own.
    SelfVote,
    /// The caller tried to report an entity they own.
    SelfReport,
    /// The caller already holds a pending report against this entity.
    DuplicatePending,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::SelfVote => write!(f, "cannot vote on your own content"),
            ConflictKind::SelfReport => write!(f, "cannot report your own content"),
            ConflictKind::DuplicatePending => {
                write!(f, "a pending report for this content already exists")
            }
        }
    }
}

/// Error kinds surfaced by the trust core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The referenced entity, vote or report does not exist.
    NotFound,
    /// A value fell outside its closed set or documented bounds.
    InvalidArgument(String),
    /// A business rule rejected the operation before any row was written.
    Conflict(ConflictKind),
    /// A request ceiling was exceeded. Normal control flow, not a fault.
    RateLimited {
        /// Which window rejected the request.
        scope: LimitScope,
    },
}

impl Error {
    /// Build an `InvalidArgument` from any message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "not found"),
            Error::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Error::Conflict(kind) => write!(f, "conflict: {kind}"),
            Error::RateLimited { scope } => write!(f, "{}", scope.reason()),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(Error::NotFound.to_string(), "not found");
        assert_eq!(
            Error::invalid_argument("bad reason").to_string(),
            "invalid argument: bad reason"
        );
        assert_eq!(
            Error::Conflict(ConflictKind::SelfReport).to_string(),
            "conflict: cannot report your own content"
        );
        assert_eq!(
            Error::RateLimited {
                scope: LimitScope::Minute
            }
            .to_string(),
            "minute limit exceeded"
        );
    }

    #[test]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error>(_: E) {}
        assert_error(Error::NotFound);
    }
}
