#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Lifecycle coordinator flows against the in-process bridge: every
//! operation marks the request with its intent before delegating and
//! returns the request to idle on every exit path.

use std::sync::Arc;

use async_trait::async_trait;
use gatekit_auth::{
    AuthIntent, AuthModule, AuthParameters, AuthStatus, LocalRequestContext, RequestContextBridge,
    TransportError, coordinator, keys,
};
use gatekit_security::SecurityContext;
use parking_lot::Mutex;

/// Records what the module observed on the shared context while the
/// delegated call was in progress.
#[derive(Debug, Default)]
struct Observed {
    intent: Option<AuthIntent>,
    explicit: bool,
    refresh: bool,
    params_username: Option<String>,
}

struct ProbeModule {
    status: AuthStatus,
    observed: Mutex<Observed>,
}

impl ProbeModule {
    fn new(status: AuthStatus) -> Self {
        Self {
            status,
            observed: Mutex::new(Observed::default()),
        }
    }

    fn observed(&self) -> Observed {
        std::mem::take(&mut *self.observed.lock())
    }
}

#[async_trait]
impl AuthModule for ProbeModule {
    async fn validate_request(
        &self,
        ctx: &dyn RequestContextBridge,
        _client_identity: &mut SecurityContext,
        _service_identity: Option<&mut SecurityContext>,
    ) -> anyhow::Result<AuthStatus> {
        *self.observed.lock() = Observed {
            intent: ctx.intent(),
            explicit: coordinator::is_explicit_auth_call(ctx),
            refresh: coordinator::is_refresh_request(ctx),
            params_username: coordinator::get_auth_parameters(ctx)
                .username()
                .map(ToOwned::to_owned),
        };
        Ok(self.status)
    }
}

fn assert_idle(ctx: &LocalRequestContext) {
    assert_eq!(ctx.intent(), None);
    assert!(!ctx.is_refresh());
    assert_eq!(ctx.attribute(keys::IS_AUTHENTICATION), None);
    assert_eq!(ctx.attribute(keys::IS_AUTHENTICATION_FROM_FILTER), None);
    assert_eq!(ctx.attribute(keys::IS_LOGOUT), None);
    assert_eq!(ctx.attribute(keys::IS_REFRESH), None);
}

#[tokio::test]
async fn authenticate_success_clears_intent() {
    let ctx = LocalRequestContext::new().script_native_authenticate(|| Ok(true));

    let authenticated = coordinator::authenticate(&ctx, None).await.unwrap();

    assert!(authenticated);
    assert_idle(&ctx);
}

#[tokio::test]
async fn authenticate_rejection_clears_intent() {
    let ctx = LocalRequestContext::new().script_native_authenticate(|| Ok(false));

    let authenticated = coordinator::authenticate(&ctx, None).await.unwrap();

    assert!(!authenticated);
    assert_idle(&ctx);
}

#[tokio::test]
async fn authenticate_transport_error_still_clears_intent() {
    let ctx = LocalRequestContext::new()
        .script_native_authenticate(|| Err(TransportError::Protocol("broken pipe".to_owned())));

    let result = coordinator::authenticate(&ctx, None).await;

    assert!(result.is_err());
    assert_idle(&ctx);
}

#[tokio::test]
async fn authenticate_marks_intent_and_params_during_delegation() {
    let module = Arc::new(ProbeModule::new(AuthStatus::Success));
    let ctx = LocalRequestContext::with_module(module.clone());
    let params = AuthParameters::builder().username("alice").build();

    let authenticated = coordinator::authenticate(&ctx, Some(params)).await.unwrap();
    assert!(authenticated);

    let observed = module.observed();
    assert_eq!(observed.intent, Some(AuthIntent::Authenticate));
    assert!(observed.explicit);
    assert!(!observed.refresh);
    assert_eq!(observed.params_username.as_deref(), Some("alice"));

    // Both the intent and the stored parameters are gone afterwards.
    assert_idle(&ctx);
    assert_eq!(ctx.attribute(keys::AUTH_PARAMS), None);
    assert!(ctx.auth_parameters().is_none());
}

#[tokio::test]
async fn authenticate_without_params_leaves_preexisting_params_in_place() {
    let module = Arc::new(ProbeModule::new(AuthStatus::Success));
    let ctx = LocalRequestContext::with_module(module.clone());
    // Request-derived parameters seeded by the transport glue.
    ctx.set_auth_parameters(AuthParameters::builder().username("bob").build());

    coordinator::authenticate(&ctx, None).await.unwrap();

    assert_eq!(module.observed().params_username.as_deref(), Some("bob"));
    // The coordinator only removes parameters it stored itself.
    assert!(ctx.auth_parameters().is_some());
}

#[tokio::test]
async fn authenticate_from_filter_marks_filter_intent() {
    let module = Arc::new(ProbeModule::new(AuthStatus::Success));
    let ctx = LocalRequestContext::with_module(module.clone());

    let authenticated = coordinator::authenticate_from_filter(&ctx).await.unwrap();
    assert!(authenticated);

    let observed = module.observed();
    assert_eq!(observed.intent, Some(AuthIntent::AuthenticateFromFilter));
    assert!(observed.explicit);
    assert_idle(&ctx);
}

#[tokio::test]
async fn refresh_logs_out_strictly_before_authenticating() {
    let module = Arc::new(ProbeModule::new(AuthStatus::Success));
    let ctx = LocalRequestContext::with_module(module.clone());

    let authenticated = coordinator::refresh_authentication(&ctx, None)
        .await
        .unwrap();
    assert!(authenticated);

    assert_eq!(ctx.native_call_log(), vec!["logout", "authenticate"]);

    // During the nested authenticate the module sees both the refresh
    // marker and the authenticate intent.
    let observed = module.observed();
    assert_eq!(observed.intent, Some(AuthIntent::Authenticate));
    assert!(observed.refresh);
    assert_idle(&ctx);
}

#[tokio::test]
async fn refresh_clears_marker_on_transport_error() {
    let ctx = LocalRequestContext::new()
        .script_native_authenticate(|| Err(TransportError::Protocol("unreachable".to_owned())));

    let result = coordinator::refresh_authentication(&ctx, None).await;

    assert!(result.is_err());
    assert_idle(&ctx);
}

#[tokio::test]
async fn logout_signals_module_and_invalidates_session() {
    let module = Arc::new(ProbeModule::new(AuthStatus::Success));
    let ctx = LocalRequestContext::with_module(module.clone());
    let mut identity = SecurityContext::anonymous();
    identity.set_caller_principal("alice");
    ctx.set_identity(identity);

    coordinator::logout(&ctx).await.unwrap();

    assert_eq!(
        ctx.native_call_log(),
        vec!["logout", "authenticate", "invalidate_session"]
    );
    let observed = module.observed();
    assert_eq!(observed.intent, Some(AuthIntent::Logout));
    assert!(observed.explicit);
    assert!(ctx.session_invalidated());
    assert_eq!(ctx.caller_principal(), None);
    assert_idle(&ctx);
}

#[tokio::test]
async fn logout_clears_intent_when_signal_pass_fails() {
    let ctx = LocalRequestContext::new()
        .script_native_authenticate(|| Err(TransportError::Protocol("gone".to_owned())));

    let result = coordinator::logout(&ctx).await;

    assert!(result.is_err());
    // The failure happened after the native logout, before invalidation.
    assert!(!ctx.session_invalidated());
    assert_idle(&ctx);
}
