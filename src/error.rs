//! Error taxonomy for the localization client.
//!
//! Only `InvalidArgument` ever reaches lookup callers: provider and transport
//! failures are absorbed (and logged) at the refresh-engine boundary so that a
//! lookup degrades to stale data or `NotFound` instead of an error. A `304 Not
//! Modified` and a missing translation are modeled as values, not errors.

use thiserror::Error;

/// Everything that can go wrong inside the localization client.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller passed an empty key, locale, or header. Raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The provider rejected the access token. Fatal for the current refresh
    /// cycle but never for the process.
    #[error("translation provider rejected the access token")]
    Unauthorized,

    /// Network or connection failure while talking to the provider.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider answered with a status we do not handle.
    #[error("unexpected provider status {0}")]
    UnexpectedStatus(u16),

    /// The provider answered 200 but the body did not parse.
    #[error("malformed provider response: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::InvalidArgument("translation key is empty");
        assert_eq!(
            err.to_string(),
            "invalid argument: translation key is empty"
        );
    }

    #[test]
    fn test_unexpected_status_display() {
        let err = Error::UnexpectedStatus(503);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_unauthorized_display() {
        let err = Error::Unauthorized;
        assert!(err.to_string().contains("access token"));
    }
}
