//! Axum extractors and middleware driving the lifecycle coordinator.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, Method, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use gatekit_security::SecurityContext;
use tower::{Layer, Service};

use crate::bridge::RequestContextBridge;
use crate::coordinator;
use crate::keys;
use crate::memory::LocalRequestContext;
use crate::outcome::AuthStatus;
use crate::params::AuthParameters;
use crate::plugin_api::AuthModule;

/// Decides whether a route requires an authenticated caller.
pub trait RoutePolicy: Send + Sync {
    fn is_protected(&self, method: &Method, path: &str) -> bool;
}

impl<F> RoutePolicy for F
where
    F: Fn(&Method, &str) -> bool + Send + Sync,
{
    fn is_protected(&self, method: &Method, path: &str) -> bool {
        self(method, path)
    }
}

/// Extractor for the request's [`SecurityContext`] - validates that the
/// coordination middleware has run.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub SecurityContext);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = MissingAuthLayer;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(CallerIdentity)
            .ok_or(MissingAuthLayer)
    }
}

/// Extractor for the per-request context bridge, so handlers can drive
/// explicit coordinator operations (authenticate, refresh, logout).
#[derive(Clone)]
pub struct AuthContext(pub Arc<LocalRequestContext>);

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = MissingAuthLayer;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<LocalRequestContext>>()
            .cloned()
            .map(AuthContext)
            .ok_or(MissingAuthLayer)
    }
}

/// Rejection for extractors used without [`AuthCoordLayer`] installed.
#[derive(Debug, Clone, Copy)]
pub struct MissingAuthLayer;

impl IntoResponse for MissingAuthLayer {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "authentication coordination middleware not configured",
        )
            .into_response()
    }
}

/// Shared state for the coordination middleware.
struct AuthCoordInner {
    module: Arc<dyn AuthModule>,
    policy: Arc<dyn RoutePolicy>,
}

/// Layer that runs the pipeline's native authentication step for every
/// request via the lifecycle coordinator.
///
/// # Example
/// ```ignore
/// router = router.layer(AuthCoordLayer::new(module, policy));
/// ```
#[derive(Clone)]
pub struct AuthCoordLayer {
    inner: Arc<AuthCoordInner>,
}

impl AuthCoordLayer {
    pub fn new(module: Arc<dyn AuthModule>, policy: Arc<dyn RoutePolicy>) -> Self {
        Self {
            inner: Arc::new(AuthCoordInner { module, policy }),
        }
    }
}

impl<S> Layer<S> for AuthCoordLayer {
    type Service = AuthCoordService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthCoordService {
            inner,
            state: self.inner.clone(),
        }
    }
}

/// Service that applies the authentication coordination protocol to
/// each request.
#[derive(Clone)]
pub struct AuthCoordService<S> {
    inner: S,
    state: Arc<AuthCoordInner>,
}

impl<S> Service<Request<Body>> for AuthCoordService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            // CORS preflight requests carry no credentials to evaluate.
            if is_preflight_request(request.method(), request.headers()) {
                return ready_inner.call(request).await;
            }

            // One bridge per request; the module observes the same
            // context the coordinator operates on.
            let ctx = Arc::new(LocalRequestContext::with_module(state.module.clone()));
            if state
                .policy
                .is_protected(request.method(), request.uri().path())
            {
                ctx.put_map_entry(keys::IS_MANDATORY, true.to_string());
            }
            if let Some(params) = extract_basic_parameters(request.headers()) {
                ctx.set_auth_parameters(params);
            }

            // Pipeline-triggered authentication: the native step with no
            // explicit intent marked, so modules see an implicit call.
            match ctx.native_authenticate().await {
                Ok(true) => {
                    if coordinator::is_register_session(ctx.as_ref())
                        && let Some((username, _)) = ctx.logged_in()
                    {
                        tracing::debug!(%username, "session registration requested");
                    }
                    request.extensions_mut().insert(ctx.identity());
                    request.extensions_mut().insert(ctx.clone());
                    ready_inner.call(request).await
                }
                Ok(false) => {
                    let status = coordinator::get_last_status(ctx.as_ref());
                    Ok(rejection_response(status))
                }
                Err(err) => {
                    tracing::error!(error = %err, "native authentication step failed");
                    Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
                }
            }
        })
    }
}

/// Map a rejecting module status to the response the transport sends.
fn rejection_response(status: Option<AuthStatus>) -> Response {
    match status {
        // The module asked for a continuation: challenge the client.
        Some(AuthStatus::SendContinue) => (
            StatusCode::UNAUTHORIZED,
            [("www-authenticate", "Basic")],
            "authentication required",
        )
            .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Extract Basic credentials into [`AuthParameters`], if present.
fn extract_basic_parameters(headers: &HeaderMap) -> Option<AuthParameters> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = String::from_utf8(BASE64_STANDARD.decode(encoded).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(
        AuthParameters::builder()
            .username(username)
            .password(password.to_owned())
            .build(),
    )
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
