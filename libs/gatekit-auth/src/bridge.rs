//! The narrow interface between the coordinator and the transport.

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::outcome::AuthStatus;
use crate::params::AuthParameters;
use crate::request_state::AuthIntent;

/// Per-request bridge to the underlying transport.
///
/// One instance exists per in-flight request; implementations own the
/// isolation between concurrent requests. All accessors take `&self`
/// because the authentication module observes and mutates the same
/// context the coordinator holds while a delegated call is in progress;
/// implementations use interior mutability and must not hold locks
/// across the async native steps.
///
/// The request-scoped coordination state behind these accessors is typed
/// (see [`crate::request_state::RequestAuthState`]); only the transport
/// map exchanged with the module layer stays string-keyed, with
/// stringified booleans, for cross-implementation compatibility.
#[async_trait]
pub trait RequestContextBridge: Send + Sync {
    /// The active authentication intent, if any.
    fn intent(&self) -> Option<AuthIntent>;

    /// Mark the request with an intent. Every set is paired with exactly
    /// one [`clear_intent`](Self::clear_intent) on the same call stack.
    fn set_intent(&self, intent: AuthIntent);

    /// Return the request to the idle state.
    fn clear_intent(&self);

    /// Whether an explicit re-authentication wraps the current step.
    fn is_refresh(&self) -> bool;

    fn set_refresh(&self, refresh: bool);

    /// Whether the module declared real authentication was attempted.
    fn did_authentication(&self) -> bool;

    fn set_did_authentication(&self);

    /// Caller-supplied parameters stored for the current operation.
    fn auth_parameters(&self) -> Option<AuthParameters>;

    fn set_auth_parameters(&self, params: AuthParameters);

    fn remove_auth_parameters(&self);

    /// Most recent authentication status recorded on the request.
    fn last_status(&self) -> Option<AuthStatus>;

    fn set_last_status(&self, status: AuthStatus);

    /// The caller principal currently established on the request, if any.
    fn caller_principal(&self) -> Option<String>;

    /// Record the identity to persist at session registration.
    fn set_logged_in(&self, username: &str, roles: &[String]);

    /// The identity recorded for session registration, if any.
    fn logged_in(&self) -> Option<(String, Vec<String>)>;

    /// Run the pipeline's native authentication step, which internally
    /// invokes the configured authentication module. Returns whether the
    /// step reported success.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the step fails for I/O or
    /// protocol reasons. A rejected authentication is `Ok(false)`, not
    /// an error.
    async fn native_authenticate(&self) -> Result<bool, TransportError>;

    /// Run the pipeline's native logout step, clearing the established
    /// identity and module-held login state.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the step fails for I/O or
    /// protocol reasons.
    async fn native_logout(&self) -> Result<(), TransportError>;

    /// Invalidate the transport session associated with the request.
    fn invalidate_session(&self);

    /// Read an entry from the transport map shared with the module layer.
    fn get_map_entry(&self, key: &str) -> Option<String>;

    /// Write an entry to the transport map shared with the module layer.
    fn put_map_entry(&self, key: &str, value: String);
}
