#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The axum layer drives the full protocol per request: pipeline-
//! triggered validation, response mapping, identity exposure, and
//! handler-driven explicit operations.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
    routing::{get, post},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use gatekit_auth::{
    AuthModule, AuthStatus, RequestContextBridge,
    axum_ext::{AuthContext, AuthCoordLayer, CallerIdentity},
    coordinator,
};
use gatekit_security::SecurityContext;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// A minimal credential-checking module for the layer tests: accepts
/// exactly alice/opensesame on protected routes, anonymous elsewhere.
struct FixedModule;

#[async_trait]
impl AuthModule for FixedModule {
    async fn validate_request(
        &self,
        ctx: &dyn RequestContextBridge,
        client_identity: &mut SecurityContext,
        _service_identity: Option<&mut SecurityContext>,
    ) -> anyhow::Result<AuthStatus> {
        if coordinator::is_logout_request(ctx) {
            coordinator::clean_identity(client_identity);
            return Ok(AuthStatus::Success);
        }

        let params = coordinator::get_auth_parameters(ctx);
        let valid = params.username() == Some("alice")
            && params
                .password()
                .is_some_and(|p| secrecy::ExposeSecret::expose_secret(p) == "opensesame");
        if valid {
            coordinator::set_did_authentication(ctx);
            client_identity.set_caller_principal("alice");
            client_identity.add_groups(["user"]);
            coordinator::set_register_session(ctx, "alice", &["user".to_owned()]);
            return Ok(AuthStatus::Success);
        }

        if coordinator::is_protected_resource(ctx) {
            if params.username().is_some() {
                return Ok(AuthStatus::SendFailure);
            }
            return Ok(AuthStatus::SendContinue);
        }
        Ok(AuthStatus::Success)
    }
}

/// Module that fails unexpectedly, to exercise the error boundary.
struct BrokenModule;

#[async_trait]
impl AuthModule for BrokenModule {
    async fn validate_request(
        &self,
        _ctx: &dyn RequestContextBridge,
        _client_identity: &mut SecurityContext,
        _service_identity: Option<&mut SecurityContext>,
    ) -> anyhow::Result<AuthStatus> {
        anyhow::bail!("directory offline")
    }
}

async fn whoami(CallerIdentity(identity): CallerIdentity) -> String {
    identity
        .caller_principal()
        .unwrap_or("anonymous")
        .to_owned()
}

async fn leave(AuthContext(ctx): AuthContext) -> StatusCode {
    match coordinator::logout(ctx.as_ref()).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn app(module: Arc<dyn AuthModule>) -> Router {
    let policy = Arc::new(|_method: &Method, path: &str| path.starts_with("/admin"));
    Router::new()
        .route("/public", get(whoami))
        .route("/admin", get(whoami))
        .route("/logout", post(leave))
        .layer(AuthCoordLayer::new(module, policy))
}

fn basic(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{username}:{password}"))
    )
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn public_route_passes_with_anonymous_identity() {
    let app = app(Arc::new(FixedModule));

    let response = app
        .oneshot(Request::builder().uri("/public").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "anonymous");
}

#[tokio::test]
async fn protected_route_without_credentials_gets_a_challenge() {
    let app = app(Arc::new(FixedModule));

    let response = app
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Basic")
    );
}

#[tokio::test]
async fn protected_route_with_valid_credentials_exposes_identity() {
    let app = app(Arc::new(FixedModule));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header("authorization", basic("alice", "opensesame"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "alice");
}

#[tokio::test]
async fn protected_route_with_bad_credentials_is_rejected() {
    let app = app(Arc::new(FixedModule));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header("authorization", basic("alice", "wrong"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("www-authenticate").is_none());
}

#[tokio::test]
async fn module_error_maps_to_internal_server_error() {
    let app = app(Arc::new(BrokenModule));

    let response = app
        .oneshot(Request::builder().uri("/public").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn handler_can_drive_an_explicit_logout() {
    let app = app(Arc::new(FixedModule));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header("authorization", basic("alice", "opensesame"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn requests_do_not_leak_state_between_each_other() {
    let app = app(Arc::new(FixedModule));

    let authenticated = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header("authorization", basic("alice", "opensesame"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(authenticated.status(), StatusCode::OK);

    // A fresh request gets a fresh context: no identity carries over.
    let anonymous = app
        .oneshot(Request::builder().uri("/public").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_string(anonymous).await, "anonymous");
}
