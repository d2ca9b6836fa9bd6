//! Configuration for the static authentication module.

use serde::Deserialize;

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthModuleConfig {
    /// Authentication mode.
    pub mode: AuthMode,

    /// Identity returned in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Static credential-to-identity mappings for `static_credentials` mode.
    pub users: Vec<UserEntry>,
}

impl Default for StaticAuthModuleConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::AcceptAll,
            default_identity: IdentityConfig::default(),
            users: Vec::new(),
        }
    }
}

/// Authentication mode.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Accept any supplied username and return the default identity.
    #[default]
    AcceptAll,
    /// Map specific username/password pairs to specific identities.
    StaticCredentials,
}

/// Identity configuration for a caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Username attached as the caller principal.
    pub username: String,

    /// Role names in the order they are attached.
    pub roles: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            username: "guest".to_owned(),
            roles: vec!["user".to_owned()],
        }
    }
}

/// Maps a username/password pair to an identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserEntry {
    /// The username to match.
    pub username: String,
    /// The password to match.
    pub password: String,
    /// Role names attached when these credentials are presented.
    pub roles: Vec<String>,
}
