//! Caller-supplied hints for one authentication attempt.

use secrecy::SecretString;

/// Immutable bag of caller-supplied authentication hints.
///
/// Owned by the caller and borrowed read-only by the coordinator for the
/// duration of a single operation; never persisted beyond the request.
/// The password is wrapped in [`SecretString`] so `Debug` redacts it.
#[derive(Debug, Clone, Default)]
pub struct AuthParameters {
    username: Option<String>,
    password: Option<SecretString>,
    remember_me: Option<bool>,
    redirect_url: Option<String>,
}

impl AuthParameters {
    /// Create a builder for `AuthParameters`.
    #[must_use]
    pub fn builder() -> AuthParametersBuilder {
        AuthParametersBuilder::default()
    }

    /// Username credential, if supplied.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Password credential, if supplied.
    #[must_use]
    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// Whether the caller asked for a persistent ("remember me") login.
    #[must_use]
    pub fn remember_me(&self) -> Option<bool> {
        self.remember_me
    }

    /// Target to redirect to after a successful authentication.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }
}

#[derive(Default)]
pub struct AuthParametersBuilder {
    username: Option<String>,
    password: Option<SecretString>,
    remember_me: Option<bool>,
    redirect_url: Option<String>,
}

impl AuthParametersBuilder {
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<SecretString>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = Some(remember_me);
        self
    }

    #[must_use]
    pub fn redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    #[must_use]
    pub fn build(self) -> AuthParameters {
        AuthParameters {
            username: self.username,
            password: self.password,
            remember_me: self.remember_me,
            redirect_url: self.redirect_url,
        }
    }
}
