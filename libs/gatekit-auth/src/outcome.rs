//! Authentication status vocabulary and per-invocation result.

use std::fmt;

/// The recognized authentication status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// Authentication completed and the request may proceed.
    Success,
    /// Authentication was attempted and rejected.
    Failure,
    /// The module sent a continuation (e.g. a challenge); the request
    /// must not proceed to the application yet.
    SendContinue,
    /// The module sent a failure response itself.
    SendFailure,
}

impl AuthStatus {
    /// True for the statuses that represent a rejected authentication.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failure | Self::SendFailure)
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::SendContinue => "send_continue",
            Self::SendFailure => "send_failure",
        };
        f.write_str(name)
    }
}

/// Outcome of one authentication module invocation.
///
/// Exactly one of the two variants is meaningful: a status reported by the
/// module, or the error it failed with. Produced only by
/// [`crate::coordinator::validate_request`]; consumed once, not retained.
#[derive(Debug)]
pub enum AuthResult {
    /// The module ran to completion and reported a status.
    Status(AuthStatus),
    /// The module failed with an unexpected error. No status is meaningful.
    Failure(anyhow::Error),
}

impl AuthResult {
    /// The reported status, if the module ran to completion.
    #[must_use]
    pub fn status(&self) -> Option<AuthStatus> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Failure(_) => None,
        }
    }

    /// The module error, if one occurred.
    #[must_use]
    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Status(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// True when the invocation did not authenticate the caller, whether
    /// through a rejecting status or a module error.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        match self {
            Self::Status(status) => status.is_failure(),
            Self::Failure(_) => true,
        }
    }
}
