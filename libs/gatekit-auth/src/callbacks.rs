//! Propagation of verified identity facts into the identity subsystem.

use gatekit_security::SecurityContext;

use crate::errors::{AuthError, CallbackError};

/// One directive instructing the identity subsystem to attach identity
/// facts to the current security context.
///
/// Directives execute synchronously, immediately after construction. How
/// principal and group data are represented internally is up to the
/// subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityDirective {
    /// Attach the caller principal (the verified username).
    CallerPrincipal { username: String },
    /// Attach group memberships alongside the caller principal.
    Groups { groups: Vec<String> },
}

/// Executes identity directives against a security context.
///
/// The seam to the underlying identity subsystem. Expected to always
/// succeed for well-formed input; a failure is an integration defect,
/// not a user-facing condition.
pub trait IdentityCallbackHandler: Send + Sync {
    /// Execute one directive.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError`] when the subsystem cannot apply the
    /// directive. Callers treat this as fatal.
    fn handle(
        &self,
        identity: &mut SecurityContext,
        directive: IdentityDirective,
    ) -> Result<(), CallbackError>;
}

/// The default handler: applies directives directly to the
/// [`SecurityContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreCallbackHandler;

impl IdentityCallbackHandler for StoreCallbackHandler {
    fn handle(
        &self,
        identity: &mut SecurityContext,
        directive: IdentityDirective,
    ) -> Result<(), CallbackError> {
        match directive {
            IdentityDirective::CallerPrincipal { username } => {
                identity.set_caller_principal(username);
            }
            IdentityDirective::Groups { groups } => {
                identity.add_groups(groups);
            }
        }
        Ok(())
    }
}

/// Publish a verified login to the identity subsystem.
///
/// Executes a caller-principal directive, then (only if `roles` is
/// non-empty) a group directive preserving role order and contents.
///
/// # Errors
///
/// Returns [`AuthError::ContractViolation`] if the handler fails; the
/// directive mechanism is expected to always succeed, so this is
/// non-recoverable.
pub fn notify_login(
    identity: &mut SecurityContext,
    handler: &dyn IdentityCallbackHandler,
    username: &str,
    roles: &[String],
) -> Result<(), AuthError> {
    handler.handle(
        identity,
        IdentityDirective::CallerPrincipal {
            username: username.to_owned(),
        },
    )?;

    if !roles.is_empty() {
        handler.handle(
            identity,
            IdentityDirective::Groups {
                groups: roles.to_vec(),
            },
        )?;
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every directive it executes before delegating to the store.
    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<IdentityDirective>>,
    }

    impl IdentityCallbackHandler for RecordingHandler {
        fn handle(
            &self,
            identity: &mut SecurityContext,
            directive: IdentityDirective,
        ) -> Result<(), CallbackError> {
            self.seen.lock().unwrap().push(directive.clone());
            StoreCallbackHandler.handle(identity, directive)
        }
    }

    struct FailingHandler;

    impl IdentityCallbackHandler for FailingHandler {
        fn handle(
            &self,
            _identity: &mut SecurityContext,
            _directive: IdentityDirective,
        ) -> Result<(), CallbackError> {
            Err(CallbackError::Rejected("store offline".to_owned()))
        }
    }

    #[test]
    fn empty_roles_issue_exactly_one_directive() {
        let handler = RecordingHandler::default();
        let mut identity = SecurityContext::anonymous();

        notify_login(&mut identity, &handler, "alice", &[]).unwrap();

        let seen = handler.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![IdentityDirective::CallerPrincipal {
                username: "alice".to_owned()
            }]
        );
        assert_eq!(identity.caller_principal(), Some("alice"));
        assert!(identity.groups().is_empty());
    }

    #[test]
    fn non_empty_roles_issue_two_directives_in_order() {
        let handler = RecordingHandler::default();
        let mut identity = SecurityContext::anonymous();
        let roles = vec!["architect".to_owned(), "employee".to_owned()];

        notify_login(&mut identity, &handler, "alice", &roles).unwrap();

        let seen = handler.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                IdentityDirective::CallerPrincipal {
                    username: "alice".to_owned()
                },
                IdentityDirective::Groups {
                    groups: roles.clone()
                },
            ]
        );
        assert_eq!(identity.groups(), &["architect", "employee"]);
    }

    #[test]
    fn handler_failure_is_a_contract_violation() {
        let mut identity = SecurityContext::anonymous();

        let err = notify_login(&mut identity, &FailingHandler, "alice", &[]).unwrap_err();

        assert!(matches!(err, AuthError::ContractViolation(_)));
    }
}
