//! Stable string keys for request state exchanged with transports.
//!
//! Request-scoped coordination state is typed (see
//! [`crate::request_state::RequestAuthState`]); these constants are the
//! canonical names under which transports externalize that state, e.g. in
//! an attribute map surfaced for diagnostics or cross-process handoff.
//! The values are a stable contract and must not change.

/// An initial or explicit authentication is in progress.
pub const IS_AUTHENTICATION: &str = "gatekit.auth.request.authentication";

/// Authentication was invoked from an upstream pipeline stage.
pub const IS_AUTHENTICATION_FROM_FILTER: &str = "gatekit.auth.request.authentication_from_filter";

/// A response-securing phase is in progress.
pub const IS_SECURE_RESPONSE: &str = "gatekit.auth.request.secure_response";

/// A logout is in progress.
pub const IS_LOGOUT: &str = "gatekit.auth.request.logout";

/// An explicit re-authentication wraps the current authenticate step.
pub const IS_REFRESH: &str = "gatekit.auth.request.refresh";

/// The module declared that real authentication was attempted this request.
pub const DID_AUTHENTICATION: &str = "gatekit.auth.request.did_authentication";

/// Caller-supplied authentication parameters for the current operation.
pub const AUTH_PARAMS: &str = "gatekit.auth.request.auth_params";

/// Username recorded at session registration.
pub const LOGGEDIN_USERNAME: &str = "gatekit.auth.loggedin.username";

/// Roles recorded at session registration.
pub const LOGGEDIN_ROLES: &str = "gatekit.auth.loggedin.roles";

/// Most recent authentication status recorded on the request.
pub const LAST_AUTH_STATUS: &str = "gatekit.auth.status";

/// Transport map entry: persist the authenticated identity across requests.
/// Value is a stringified boolean for cross-implementation compatibility.
pub const REGISTER_SESSION: &str = "gatekit.session.register";

/// Transport map entry: the accessed resource requires authentication.
/// Some transports omit the key entirely instead of sending `"false"`;
/// an absent entry reads as false.
pub const IS_MANDATORY: &str = "gatekit.policy.is_mandatory";
