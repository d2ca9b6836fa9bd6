//! In-process request context, the bridge implementation used by the
//! axum layer and by embedders and tests that drive the coordinator
//! directly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gatekit_security::SecurityContext;
use parking_lot::Mutex;

use crate::bridge::RequestContextBridge;
use crate::coordinator;
use crate::errors::TransportError;
use crate::outcome::{AuthResult, AuthStatus};
use crate::params::AuthParameters;
use crate::plugin_api::AuthModule;
use crate::request_state::{AuthIntent, RequestAuthState};

type NativeScript = Box<dyn Fn() -> Result<bool, TransportError> + Send + Sync>;

/// A per-request context backed by in-process state.
///
/// Its native authentication step invokes the configured
/// [`AuthModule`] the way a real pipeline's native step does, so module
/// code observes the same re-entrant context the coordinator holds. A
/// scripted outcome can replace the module for tests that exercise the
/// coordinator's transport boundary.
///
/// One instance per request; state is never shared across requests.
#[derive(Default)]
pub struct LocalRequestContext {
    state: Mutex<RequestAuthState>,
    map: Mutex<HashMap<String, String>>,
    identity: Mutex<SecurityContext>,
    session_invalidated: Mutex<bool>,
    native_calls: Mutex<Vec<&'static str>>,
    module: Option<Arc<dyn AuthModule>>,
    script: Option<NativeScript>,
}

impl LocalRequestContext {
    /// Create a context with no module configured. The native
    /// authentication step fails until a module or script is attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose native authentication step invokes `module`.
    #[must_use]
    pub fn with_module(module: Arc<dyn AuthModule>) -> Self {
        Self {
            module: Some(module),
            ..Self::default()
        }
    }

    /// Replace the native authentication step with a scripted outcome.
    #[must_use]
    pub fn script_native_authenticate<F>(mut self, script: F) -> Self
    where
        F: Fn() -> Result<bool, TransportError> + Send + Sync + 'static,
    {
        self.script = Some(Box::new(script));
        self
    }

    /// The identity established on this request so far.
    #[must_use]
    pub fn identity(&self) -> SecurityContext {
        self.identity.lock().clone()
    }

    /// Replace the established identity (e.g. one restored from a
    /// persisted session by the transport).
    pub fn set_identity(&self, identity: SecurityContext) {
        *self.identity.lock() = identity;
    }

    /// Whether [`RequestContextBridge::invalidate_session`] has run.
    #[must_use]
    pub fn session_invalidated(&self) -> bool {
        *self.session_invalidated.lock()
    }

    /// The request state rendered under its stable attribute key, if set.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .attribute_view()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// Order of native steps taken on this context, for diagnostics.
    #[must_use]
    pub fn native_call_log(&self) -> Vec<&'static str> {
        self.native_calls.lock().clone()
    }

    async fn run_module(&self, module: &dyn AuthModule) -> Result<bool, TransportError> {
        let mut identity = self.identity.lock().clone();
        let result = coordinator::validate_request(module, self, &mut identity, None).await;
        if let Some(status) = result.status() {
            self.set_last_status(status);
        }
        match result {
            AuthResult::Status(AuthStatus::Success) => {
                *self.identity.lock() = identity;
                Ok(true)
            }
            AuthResult::Status(_) => Ok(false),
            AuthResult::Failure(error) => Err(TransportError::Protocol(format!(
                "authentication module failed: {error:#}"
            ))),
        }
    }
}

#[async_trait]
impl RequestContextBridge for LocalRequestContext {
    fn intent(&self) -> Option<AuthIntent> {
        self.state.lock().intent
    }

    fn set_intent(&self, intent: AuthIntent) {
        self.state.lock().intent = Some(intent);
    }

    fn clear_intent(&self) {
        self.state.lock().intent = None;
    }

    fn is_refresh(&self) -> bool {
        self.state.lock().refresh
    }

    fn set_refresh(&self, refresh: bool) {
        self.state.lock().refresh = refresh;
    }

    fn did_authentication(&self) -> bool {
        self.state.lock().did_authentication
    }

    fn set_did_authentication(&self) {
        self.state.lock().did_authentication = true;
    }

    fn auth_parameters(&self) -> Option<AuthParameters> {
        self.state.lock().auth_parameters.clone()
    }

    fn set_auth_parameters(&self, params: AuthParameters) {
        self.state.lock().auth_parameters = Some(params);
    }

    fn remove_auth_parameters(&self) {
        self.state.lock().auth_parameters = None;
    }

    fn last_status(&self) -> Option<AuthStatus> {
        self.state.lock().last_status
    }

    fn set_last_status(&self, status: AuthStatus) {
        self.state.lock().last_status = Some(status);
    }

    fn caller_principal(&self) -> Option<String> {
        self.identity
            .lock()
            .caller_principal()
            .map(ToOwned::to_owned)
    }

    fn set_logged_in(&self, username: &str, roles: &[String]) {
        self.state.lock().logged_in = Some((username.to_owned(), roles.to_vec()));
    }

    fn logged_in(&self) -> Option<(String, Vec<String>)> {
        self.state.lock().logged_in.clone()
    }

    async fn native_authenticate(&self) -> Result<bool, TransportError> {
        self.native_calls.lock().push("authenticate");
        if let Some(script) = &self.script {
            return script();
        }
        match &self.module {
            Some(module) => self.run_module(module.as_ref()).await,
            None => Err(TransportError::Protocol(
                "no authentication module configured".to_owned(),
            )),
        }
    }

    async fn native_logout(&self) -> Result<(), TransportError> {
        self.native_calls.lock().push("logout");
        self.identity.lock().clear();
        Ok(())
    }

    fn invalidate_session(&self) {
        self.native_calls.lock().push("invalidate_session");
        *self.session_invalidated.lock() = true;
    }

    fn get_map_entry(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn put_map_entry(&self, key: &str, value: String) {
        self.map.lock().insert(key.to_owned(), value);
    }
}
