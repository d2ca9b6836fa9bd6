//! Typed request-scoped authentication state.
//!
//! One instance lives in each request context; nothing here is shared
//! across requests. The intent is a tagged value rather than a set of
//! independent booleans, so conflicting intents are unrepresentable.

use crate::keys;
use crate::outcome::AuthStatus;
use crate::params::AuthParameters;

/// Why authentication is being invoked for the current request.
///
/// `None` in [`RequestAuthState::intent`] means no explicit operation is
/// active (the pipeline triggered authentication on its own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthIntent {
    /// Initial or explicit authentication requested by application code.
    Authenticate,
    /// Authentication invoked from an upstream pipeline stage.
    AuthenticateFromFilter,
    /// A response-securing phase is in progress.
    SecureResponse,
    /// A logout is underway; the module is being notified.
    Logout,
}

/// Mutable authentication state scoped to exactly one request.
///
/// The refresh and did-authentication markers are orthogonal to the
/// intent: a refresh wraps a nested authenticate, and the module declares
/// did-authentication mid-delegation, while an intent is active.
#[derive(Debug, Default)]
pub struct RequestAuthState {
    pub intent: Option<AuthIntent>,
    pub refresh: bool,
    pub did_authentication: bool,
    pub auth_parameters: Option<AuthParameters>,
    pub last_status: Option<AuthStatus>,
    /// Username and roles recorded at session registration.
    pub logged_in: Option<(String, Vec<String>)>,
}

impl RequestAuthState {
    /// Render the state under the stable attribute keys of [`keys`].
    ///
    /// Only set facts appear; booleans are stringified for
    /// cross-implementation compatibility. Transports use this view when
    /// externalizing request state (diagnostics, attribute maps).
    #[must_use]
    pub fn attribute_view(&self) -> Vec<(&'static str, String)> {
        let mut view = Vec::new();
        let intent_key = match self.intent {
            Some(AuthIntent::Authenticate) => Some(keys::IS_AUTHENTICATION),
            Some(AuthIntent::AuthenticateFromFilter) => Some(keys::IS_AUTHENTICATION_FROM_FILTER),
            Some(AuthIntent::SecureResponse) => Some(keys::IS_SECURE_RESPONSE),
            Some(AuthIntent::Logout) => Some(keys::IS_LOGOUT),
            None => None,
        };
        if let Some(key) = intent_key {
            view.push((key, true.to_string()));
        }
        if self.refresh {
            view.push((keys::IS_REFRESH, true.to_string()));
        }
        if self.did_authentication {
            view.push((keys::DID_AUTHENTICATION, true.to_string()));
        }
        if self.auth_parameters.is_some() {
            view.push((keys::AUTH_PARAMS, "<set>".to_owned()));
        }
        if let Some(status) = self.last_status {
            view.push((keys::LAST_AUTH_STATUS, status.to_string()));
        }
        if let Some((username, roles)) = &self.logged_in {
            view.push((keys::LOGGEDIN_USERNAME, username.clone()));
            view.push((keys::LOGGEDIN_ROLES, roles.join(",")));
        }
        view
    }
}
