//! Binding middleware configuration.

use http::StatusCode;

/// What the binding middleware does when decode or validation fails.
///
/// Abort and Respond are mutually exclusive by construction; there is no
/// ordering rule to remember.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Continue the chain unchanged; nothing is stored, the client sees no
    /// error. Matches the historical default, so misconfigured targets are
    /// invisible rather than breaking existing routes.
    #[default]
    Silent,

    /// Short-circuit with the configured status and an empty body, leaving a
    /// [`BindFailure`](crate::BindFailure) in the context for an outer
    /// error-handling middleware to inspect.
    Abort,

    /// Short-circuit and write a JSON error response immediately.
    Respond,
}

/// Configuration for the binding middleware.
///
/// A plain value with named fields and explicit defaults; build one with the
/// constructors or set fields directly. One config per middleware instance,
/// immutable after construction.
///
/// # Example
///
/// ```
/// use portico_bind::{BindConfig, FailurePolicy};
/// use http::StatusCode;
///
/// let config = BindConfig::respond(StatusCode::UNPROCESSABLE_ENTITY).with_detail();
/// assert_eq!(config.policy, FailurePolicy::Respond);
/// assert!(config.detail);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindConfig {
    /// Failure policy applied to decode/validation errors.
    pub policy: FailurePolicy,

    /// Whether Respond bodies enumerate the failure (fields and rules for
    /// validation errors, decoder text otherwise). Off by default so error
    /// internals never reach clients unless asked for.
    pub detail: bool,

    /// Status code used by Abort and Respond.
    pub status: StatusCode,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::Silent,
            detail: false,
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl BindConfig {
    /// The default configuration: silent failures.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Aborts with the given status on failure, storing the error in the
    /// context.
    #[must_use]
    pub fn abort(status: StatusCode) -> Self {
        Self {
            policy: FailurePolicy::Abort,
            status,
            ..Self::default()
        }
    }

    /// Responds with the given status on failure.
    #[must_use]
    pub fn respond(status: StatusCode) -> Self {
        Self {
            policy: FailurePolicy::Respond,
            status,
            ..Self::default()
        }
    }

    /// Enables failure detail in Respond bodies.
    #[must_use]
    pub fn with_detail(mut self) -> Self {
        self.detail = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindConfig::default();
        assert_eq!(config.policy, FailurePolicy::Silent);
        assert!(!config.detail);
        assert_eq!(config.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(BindConfig::silent(), BindConfig::default());

        let abort = BindConfig::abort(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(abort.policy, FailurePolicy::Abort);
        assert_eq!(abort.status, StatusCode::UNPROCESSABLE_ENTITY);

        let respond = BindConfig::respond(StatusCode::FORBIDDEN).with_detail();
        assert_eq!(respond.policy, FailurePolicy::Respond);
        assert_eq!(respond.status, StatusCode::FORBIDDEN);
        assert!(respond.detail);
    }
}
