//! The [`AuthModule`] protocol implementation.

use std::sync::Arc;

use async_trait::async_trait;
use gatekit_auth::{
    AuthModule, AuthStatus, Authenticator, IdentityCallbackHandler, RequestContextBridge,
    StoreCallbackHandler, coordinator, notify_login,
};
use gatekit_security::SecurityContext;
use tracing::debug;

use crate::config::StaticAuthModuleConfig;
use crate::service::Service;

/// Static authentication module.
///
/// Wraps the credential-checking [`Service`] in the coordination
/// protocol: it observes the request's intent, declares
/// did-authentication for real attempts, publishes verified identities
/// through callback propagation, and requests session registration.
pub struct StaticAuthModule {
    service: Service,
    handler: Arc<dyn IdentityCallbackHandler>,
}

impl StaticAuthModule {
    /// Create a module that applies identity directives directly to the
    /// security context.
    #[must_use]
    pub fn new(cfg: &StaticAuthModuleConfig) -> Self {
        Self::with_handler(cfg, Arc::new(StoreCallbackHandler))
    }

    /// Create a module with a custom identity callback handler.
    #[must_use]
    pub fn with_handler(
        cfg: &StaticAuthModuleConfig,
        handler: Arc<dyn IdentityCallbackHandler>,
    ) -> Self {
        Self {
            service: Service::from_config(cfg),
            handler,
        }
    }
}

#[async_trait]
impl AuthModule for StaticAuthModule {
    async fn validate_request(
        &self,
        ctx: &dyn RequestContextBridge,
        client_identity: &mut SecurityContext,
        _service_identity: Option<&mut SecurityContext>,
    ) -> anyhow::Result<AuthStatus> {
        // A logout is signaled through the regular validation entry
        // point; there is no dedicated logout callback.
        if coordinator::is_logout_request(ctx) {
            coordinator::clean_identity(client_identity);
            debug!("logout signal handled, identity cleared");
            return Ok(AuthStatus::Success);
        }

        let params = coordinator::get_auth_parameters(ctx);
        if let Some(user) = self
            .service
            .check_credentials(params.username(), params.password())
        {
            coordinator::set_did_authentication(ctx);
            notify_login(
                client_identity,
                self.handler.as_ref(),
                user.username(),
                user.roles(),
            )?;
            coordinator::set_register_session(ctx, user.username(), user.roles());
            debug!(
                username = user.username(),
                explicit = coordinator::is_explicit_auth_call(ctx),
                "credentials verified"
            );
            return Ok(AuthStatus::Success);
        }

        // An application explicitly asked for authentication; rejection
        // is reported as data, not as a challenge.
        if coordinator::is_explicit_auth_call(ctx) {
            return Ok(AuthStatus::Failure);
        }

        if coordinator::is_protected_resource(ctx) {
            // Wrong credentials fail outright; absent ones get a challenge.
            if params.username().is_some() {
                return Ok(AuthStatus::SendFailure);
            }
            return Ok(AuthStatus::SendContinue);
        }

        // Unprotected resource without credentials: the do-nothing
        // protocol. No did-authentication declaration.
        Ok(AuthStatus::Success)
    }
}
