//! The lifecycle coordinator.
//!
//! Each operation works on one request's context, marks it with the
//! intent of the call, delegates to the transport's native
//! authentication step, and unconditionally returns the request to the
//! idle state: on success, on a rejected authentication, and on a
//! transport failure alike. The set/clear pairing is enforced with RAII
//! guards, so no exit path can leak intent state into a later request
//! phase.

use gatekit_security::SecurityContext;
use tracing::debug;

use crate::bridge::RequestContextBridge;
use crate::errors::AuthError;
use crate::keys;
use crate::outcome::{AuthResult, AuthStatus};
use crate::params::AuthParameters;
use crate::plugin_api::AuthModule;
use crate::request_state::AuthIntent;

/// Scoped request intent: set on construction, cleared on drop.
///
/// Guarantees the central resource-safety contract of the coordinator:
/// every intent set before a delegated call is removed on every exit
/// path, including unwinds. Transports that need to mark a
/// response-securing phase construct one with
/// [`AuthIntent::SecureResponse`] around their response processing.
pub struct IntentGuard<'a> {
    ctx: &'a dyn RequestContextBridge,
    clear_params: bool,
}

impl<'a> IntentGuard<'a> {
    /// Mark the request with `intent` for the lifetime of the guard.
    pub fn new(ctx: &'a dyn RequestContextBridge, intent: AuthIntent) -> Self {
        ctx.set_intent(intent);
        Self {
            ctx,
            clear_params: false,
        }
    }

    /// Mark the request with `intent` and, if given, store the caller's
    /// parameters; both are removed when the guard drops.
    pub fn with_parameters(
        ctx: &'a dyn RequestContextBridge,
        intent: AuthIntent,
        params: Option<AuthParameters>,
    ) -> Self {
        let mut guard = Self::new(ctx, intent);
        if let Some(params) = params {
            ctx.set_auth_parameters(params);
            guard.clear_params = true;
        }
        guard
    }
}

impl Drop for IntentGuard<'_> {
    fn drop(&mut self) {
        self.ctx.clear_intent();
        if self.clear_params {
            self.ctx.remove_auth_parameters();
        }
    }
}

/// Scoped refresh marker, orthogonal to the intent guard.
struct RefreshGuard<'a> {
    ctx: &'a dyn RequestContextBridge,
}

impl<'a> RefreshGuard<'a> {
    fn new(ctx: &'a dyn RequestContextBridge) -> Self {
        ctx.set_refresh(true);
        Self { ctx }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.ctx.set_refresh(false);
    }
}

/// Request authentication for the current request.
///
/// Marks the request with [`AuthIntent::Authenticate`] (storing `params`
/// if given), runs the transport's native authentication step, and
/// returns whether it reported success. The intent and stored parameters
/// are removed before returning, on every exit path.
///
/// # Errors
///
/// Returns [`AuthError::Transport`] when the native step fails for I/O
/// or protocol reasons. A rejected authentication is `Ok(false)`.
pub async fn authenticate(
    ctx: &dyn RequestContextBridge,
    params: Option<AuthParameters>,
) -> Result<bool, AuthError> {
    let _intent = IntentGuard::with_parameters(ctx, AuthIntent::Authenticate, params);
    let authenticated = ctx.native_authenticate().await?;
    debug!(authenticated, "explicit authentication completed");
    Ok(authenticated)
}

/// Request authentication on behalf of an upstream pipeline stage.
///
/// Same contract as [`authenticate`], with
/// [`AuthIntent::AuthenticateFromFilter`] and no parameter support.
///
/// # Errors
///
/// Returns [`AuthError::Transport`] when the native step fails.
pub async fn authenticate_from_filter(ctx: &dyn RequestContextBridge) -> Result<bool, AuthError> {
    let _intent = IntentGuard::new(ctx, AuthIntent::AuthenticateFromFilter);
    let authenticated = ctx.native_authenticate().await?;
    debug!(authenticated, "filter-driven authentication completed");
    Ok(authenticated)
}

/// Force re-evaluation of the caller's authentication.
///
/// Performs an explicit logout first and then delegates to
/// [`authenticate`]. The logout has visible side effects on the module
/// (e.g. clearing remember-me state); that is intentional, as no other
/// portable mechanism forces a module to re-evaluate. The refresh marker
/// is removed regardless of outcome.
///
/// # Errors
///
/// Returns [`AuthError::Transport`] when either native step fails.
pub async fn refresh_authentication(
    ctx: &dyn RequestContextBridge,
    params: Option<AuthParameters>,
) -> Result<bool, AuthError> {
    let _refresh = RefreshGuard::new(ctx);
    ctx.native_logout().await?;
    authenticate(ctx, params).await
}

/// Log the caller out.
///
/// Runs the native logout, then, marked with [`AuthIntent::Logout`],
/// runs the native authentication step once more: that second pass is
/// the documented mechanism for signaling the module that a logout is
/// underway, since no dedicated logout callback exists. Finally
/// invalidates the session. The intent is removed in all cases.
///
/// # Errors
///
/// Returns [`AuthError::Transport`] when either native step fails.
pub async fn logout(ctx: &dyn RequestContextBridge) -> Result<(), AuthError> {
    ctx.native_logout().await?;

    let _intent = IntentGuard::new(ctx, AuthIntent::Logout);
    let _ = ctx.native_authenticate().await?;

    ctx.invalidate_session();
    debug!("logout completed, session invalidated");
    Ok(())
}

/// Invoke the pluggable module's validation entry point.
///
/// The sole boundary where module errors become data: an error from the
/// module is wrapped into [`AuthResult::Failure`] so that a misbehaving
/// module cannot crash the coordinator; a completed run is wrapped into
/// [`AuthResult::Status`]. This function itself never fails.
pub async fn validate_request(
    module: &dyn AuthModule,
    ctx: &dyn RequestContextBridge,
    client_identity: &mut SecurityContext,
    service_identity: Option<&mut SecurityContext>,
) -> AuthResult {
    match module
        .validate_request(ctx, client_identity, service_identity)
        .await
    {
        Ok(status) => AuthResult::Status(status),
        Err(error) => {
            debug!(error = ?error, "authentication module failed during validation");
            AuthResult::Failure(error)
        }
    }
}

/// Parameters stored for the current operation, or the empty bag.
#[must_use]
pub fn get_auth_parameters(ctx: &dyn RequestContextBridge) -> AuthParameters {
    ctx.auth_parameters().unwrap_or_default()
}

/// True while an explicit authentication operation is in progress.
#[must_use]
pub fn is_authentication_request(ctx: &dyn RequestContextBridge) -> bool {
    ctx.intent() == Some(AuthIntent::Authenticate)
}

/// True while a filter-driven authentication is in progress.
#[must_use]
pub fn is_authentication_from_filter_request(ctx: &dyn RequestContextBridge) -> bool {
    ctx.intent() == Some(AuthIntent::AuthenticateFromFilter)
}

/// True while a response-securing phase is in progress.
#[must_use]
pub fn is_secure_response_request(ctx: &dyn RequestContextBridge) -> bool {
    ctx.intent() == Some(AuthIntent::SecureResponse)
}

/// True while a logout is in progress.
#[must_use]
pub fn is_logout_request(ctx: &dyn RequestContextBridge) -> bool {
    ctx.intent() == Some(AuthIntent::Logout)
}

/// True while an explicit re-authentication wraps the current step.
#[must_use]
pub fn is_refresh_request(ctx: &dyn RequestContextBridge) -> bool {
    ctx.is_refresh()
}

/// True iff any explicit operation is active on the request. Used by
/// modules to distinguish an explicitly requested authentication flow
/// from one triggered automatically by the pipeline.
#[must_use]
pub fn is_explicit_auth_call(ctx: &dyn RequestContextBridge) -> bool {
    ctx.intent().is_some()
}

/// Declare that real authentication (not the do-nothing/anonymous
/// protocol) was attempted for this request. Called by modules.
pub fn set_did_authentication(ctx: &dyn RequestContextBridge) {
    ctx.set_did_authentication();
}

/// Whether a module declared that authentication was attempted this
/// request. Does not imply it succeeded.
#[must_use]
pub fn is_did_authentication(ctx: &dyn RequestContextBridge) -> bool {
    ctx.did_authentication()
}

/// Whether a module attempted authentication AND a caller principal is
/// now established on the request.
#[must_use]
pub fn is_did_authentication_and_succeeded(ctx: &dyn RequestContextBridge) -> bool {
    ctx.did_authentication() && ctx.caller_principal().is_some()
}

/// Ask the transport to persist `username` and `roles` across subsequent
/// requests.
pub fn set_register_session(ctx: &dyn RequestContextBridge, username: &str, roles: &[String]) {
    ctx.put_map_entry(keys::REGISTER_SESSION, true.to_string());
    ctx.set_logged_in(username, roles);
}

/// Whether session registration has been requested. An absent map entry
/// reads as false: some transports omit the key instead of sending
/// `"false"`.
#[must_use]
pub fn is_register_session(ctx: &dyn RequestContextBridge) -> bool {
    map_entry_flag(ctx, keys::REGISTER_SESSION)
}

/// Whether the accessed resource requires authentication. An absent map
/// entry reads as false.
#[must_use]
pub fn is_protected_resource(ctx: &dyn RequestContextBridge) -> bool {
    map_entry_flag(ctx, keys::IS_MANDATORY)
}

/// Record the most recent authentication status on the request.
pub fn set_last_status(ctx: &dyn RequestContextBridge, status: AuthStatus) {
    ctx.set_last_status(status);
}

/// The most recent authentication status recorded on the request.
#[must_use]
pub fn get_last_status(ctx: &dyn RequestContextBridge) -> Option<AuthStatus> {
    ctx.last_status()
}

/// Remove all identity facts from an identity container.
pub fn clean_identity(identity: &mut SecurityContext) {
    identity.clear();
}

fn map_entry_flag(ctx: &dyn RequestContextBridge, key: &str) -> bool {
    ctx.get_map_entry(key)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}
