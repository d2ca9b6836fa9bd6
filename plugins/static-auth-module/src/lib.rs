#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Authentication Module
//!
//! An [`gatekit_auth::AuthModule`] implementation with static
//! credential-to-identity mapping for development and testing.
//!
//! ## Modes
//!
//! - **`accept_all`** (default): Accepts any supplied username, returns the
//!   configured default identity. Useful where a pipeline needs a populated
//!   security context without real credential checking.
//!
//! - **`static_credentials`**: Maps specific username/password pairs to
//!   specific identities. Useful for E2E tests with distinct users.
//!
//! ## Configuration
//!
//! ```yaml
//! mode: static_credentials
//! default_identity:
//!   username: "guest"
//!   roles: ["user"]
//! users:
//!   - username: "alice"
//!     password: "correct horse"
//!     roles: ["user", "admin"]
//! ```

pub mod config;
pub mod module;
pub mod service;

pub use config::StaticAuthModuleConfig;
pub use module::StaticAuthModule;
pub use service::{Service, VerifiedUser};
