//! Error taxonomy for the lifecycle coordinator.
//!
//! Two tiers: recoverable authentication outcomes are data
//! ([`crate::outcome::AuthResult`], status values); only transport-level
//! and contract-level problems surface as errors.

use thiserror::Error;

/// Failure of a native transport step (authenticate or logout).
///
/// Surfaced to the caller unchanged; never retried at this layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport failed at the I/O level.
    #[error("transport i/o failure")]
    Io(#[from] std::io::Error),

    /// The transport rejected the step at the protocol level.
    #[error("transport protocol failure: {0}")]
    Protocol(String),
}

/// Failure while executing an identity directive.
///
/// The directive mechanism is expected to always succeed for well-formed
/// input, so these indicate a broken identity-subsystem integration.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The identity subsystem rejected a directive.
    #[error("directive rejected by identity subsystem: {0}")]
    Rejected(String),

    /// The handler does not support this directive kind.
    #[error("unsupported directive: {0}")]
    Unsupported(&'static str),
}

/// Errors surfaced by coordinator operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A native transport step failed. Authentication rejection is NOT an
    /// error; this is an infrastructure failure.
    #[error("native authentication step failed")]
    Transport(#[from] TransportError),

    /// Identity callback propagation failed. Fatal: the identity
    /// subsystem integration is broken, not a user-facing condition.
    #[error("identity callback contract violation")]
    ContractViolation(#[from] CallbackError),
}
