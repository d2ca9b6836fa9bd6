//! Credential checking for the static authentication module.

use std::collections::HashMap;

use gatekit_auth::Authenticator;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{AuthMode, IdentityConfig, StaticAuthModuleConfig, UserEntry};

/// Static credential-checking service.
///
/// Verifies supplied credentials against configuration:
/// - `accept_all`: any supplied username maps to the default identity
/// - `static_credentials`: username/password pairs map to specific identities
pub struct Service {
    mode: AuthMode,
    default_identity: IdentityConfig,
    user_map: HashMap<String, UserEntry>,
}

impl Service {
    /// Create a service from module configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticAuthModuleConfig) -> Self {
        let user_map: HashMap<String, UserEntry> = cfg
            .users
            .iter()
            .map(|entry| (entry.username.clone(), entry.clone()))
            .collect();

        Self {
            mode: cfg.mode.clone(),
            default_identity: cfg.default_identity.clone(),
            user_map,
        }
    }

    /// Check the supplied credentials and return the verified identity.
    ///
    /// Returns `None` when no username was supplied, the username is
    /// unknown (in `static_credentials` mode), or the password does not
    /// match.
    #[must_use]
    pub fn check_credentials(
        &self,
        username: Option<&str>,
        password: Option<&SecretString>,
    ) -> Option<VerifiedUser> {
        let username = username?;
        if username.is_empty() {
            return None;
        }

        match &self.mode {
            AuthMode::AcceptAll => Some(VerifiedUser {
                username: self.default_identity.username.clone(),
                roles: self.default_identity.roles.clone(),
            }),
            AuthMode::StaticCredentials => {
                let entry = self.user_map.get(username)?;
                let supplied = password?;
                if supplied.expose_secret() != entry.password {
                    return None;
                }
                Some(VerifiedUser {
                    username: entry.username.clone(),
                    roles: entry.roles.clone(),
                })
            }
        }
    }
}

/// The identity a successful credential check makes available.
#[derive(Debug, Clone)]
pub struct VerifiedUser {
    username: String,
    roles: Vec<String>,
}

impl Authenticator for VerifiedUser {
    fn username(&self) -> &str {
        &self.username
    }

    fn roles(&self) -> &[String] {
        &self.roles
    }
}
