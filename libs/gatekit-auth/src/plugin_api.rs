//! The pluggable authentication module seam.
//!
//! Module implementations perform the actual credential checking; the
//! coordinator owns the protocol around them. Implementations are
//! selected by the caller's composition root, never by this crate.

use async_trait::async_trait;
use gatekit_security::SecurityContext;

use crate::bridge::RequestContextBridge;
use crate::outcome::AuthStatus;

/// A pluggable authentication module.
///
/// One entry point: validate the current request. The module reads and
/// writes the request context it is handed (the same context the
/// coordinator is operating on) to observe intent
/// ([`crate::coordinator::is_explicit_auth_call`]), declare
/// did-authentication, and request session registration.
#[async_trait]
pub trait AuthModule: Send + Sync {
    /// Validate the current request, attaching identity facts to
    /// `client_identity` on success.
    ///
    /// `service_identity` carries the identity of the service itself
    /// where the transport distinguishes one; most modules ignore it.
    ///
    /// # Errors
    ///
    /// Any error is treated as an unexpected module failure and converted
    /// into data by [`crate::coordinator::validate_request`]; it never
    /// crosses the coordinator boundary as an error.
    async fn validate_request(
        &self,
        ctx: &dyn RequestContextBridge,
        client_identity: &mut SecurityContext,
        service_identity: Option<&mut SecurityContext>,
    ) -> anyhow::Result<AuthStatus>;
}

/// Data an authentication module makes available once it has verified a
/// caller: the username and the application roles to attach.
///
/// The coordinator trusts and relays this data without validating it.
pub trait Authenticator: Send + Sync {
    /// The verified username.
    fn username(&self) -> &str;

    /// Role names in a stable order.
    fn roles(&self) -> &[String];
}
