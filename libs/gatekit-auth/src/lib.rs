#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request authentication lifecycle coordination.
//!
//! This crate owns the protocol around a pluggable authentication
//! module: why authentication is being invoked for a request, how the
//! module's outcome is interpreted, and how verified identity facts are
//! published back into the pipeline.
//!
//! - [`coordinator`] - The lifecycle operations and query predicates
//! - [`RequestContextBridge`] - The narrow transport seam, one per request
//! - [`AuthModule`] - The pluggable module extension point
//! - [`AuthParameters`] / [`AuthResult`] / [`AuthStatus`] - Data types
//! - [`notify_login`] - Identity callback propagation
//! - [`LocalRequestContext`] - In-process bridge for embedding and tests
//! - [`axum_ext`] - Axum/tower integration layer
//!
//! ## Usage
//!
//! Application code drives explicit flows through the coordinator:
//!
//! ```ignore
//! use gatekit_auth::{coordinator, AuthParameters};
//!
//! let params = AuthParameters::builder()
//!     .username("alice")
//!     .password("correct horse".to_owned())
//!     .build();
//!
//! if coordinator::authenticate(&ctx, Some(params)).await? {
//!     // identity facts are now published into the pipeline
//! }
//! ```

pub mod axum_ext;
pub mod bridge;
pub mod callbacks;
pub mod coordinator;
pub mod errors;
pub mod keys;
pub mod memory;
pub mod outcome;
pub mod params;
pub mod plugin_api;
pub mod request_state;

pub use bridge::RequestContextBridge;
pub use callbacks::{IdentityCallbackHandler, IdentityDirective, StoreCallbackHandler, notify_login};
pub use coordinator::IntentGuard;
pub use errors::{AuthError, CallbackError, TransportError};
pub use memory::LocalRequestContext;
pub use outcome::{AuthResult, AuthStatus};
pub use params::AuthParameters;
pub use plugin_api::{AuthModule, Authenticator};
pub use request_state::{AuthIntent, RequestAuthState};
