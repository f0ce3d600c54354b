//! Error-response helper.
//!
//! Shorthand for checking error states and conditionally aborting the chain
//! with a status code and a small JSON body. Whether the underlying error
//! text is exposed is decided once, at startup, when the [`ErrorResponder`]
//! is constructed - there is no process-wide toggle.

use crate::types::{Response, ResponseExt};
use http::StatusCode;
use serde_json::json;
use std::error::Error;

/// Sentinel error used to abort without leaking any detail.
///
/// When passed to [`ErrorResponder::abort_with_error`], the `"error"` field
/// is omitted from the response body even if detail output is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("error: no detail")]
pub struct NoDetail;

/// Builds JSON error responses, optionally carrying the error's description.
///
/// Constructed once at startup and handed to request handlers; the detail
/// flag is immutable afterwards. Production deployments keep detail off so
/// internal error text never reaches clients.
///
/// # Example
///
/// ```
/// use portico_core::{ErrorResponder, Response};
/// use http::StatusCode;
///
/// fn lookup() -> Result<u64, std::num::ParseIntError> {
///     "not-a-number".parse()
/// }
///
/// fn handler(responder: &ErrorResponder) -> Response {
///     let result = lookup();
///     if let Some(response) =
///         responder.abort_with_error(result.as_ref().err(), StatusCode::BAD_REQUEST, "bad_id")
///     {
///         return response;
///     }
///     // ...happy path...
///     # unreachable!()
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorResponder {
    /// Whether the error's description is included in response bodies.
    detail: bool,
}

impl ErrorResponder {
    /// Creates a responder.
    ///
    /// `detail` controls whether the `"error"` field is added to bodies.
    #[must_use]
    pub fn new(detail: bool) -> Self {
        Self { detail }
    }

    /// Returns whether detail output is enabled.
    #[must_use]
    pub fn detail_enabled(&self) -> bool {
        self.detail
    }

    /// Aborts with a JSON error body if `err` is present.
    ///
    /// Returns `Some(response)` when the error was present (the caller should
    /// stop processing and return it), `None` otherwise. The body is
    /// `{"code": <code>}`, plus an `"error"` field with the error's
    /// description when detail is enabled and the error is not [`NoDetail`].
    #[must_use]
    pub fn abort_with_error<E>(
        &self,
        err: Option<&E>,
        status: StatusCode,
        code: &str,
    ) -> Option<Response>
    where
        E: Error + 'static,
    {
        let err: &(dyn Error + 'static) = err?;

        let mut body = json!({ "code": code });
        if self.detail && !err.is::<NoDetail>() {
            body["error"] = json!(err.to_string());
        }

        Some(Response::json(status, &body))
    }

    /// Aborts unconditionally without leaking information.
    ///
    /// Shorthand for invoking [`Self::abort_with_error`] with the [`NoDetail`]
    /// sentinel.
    #[must_use]
    pub fn abort_with(&self, status: StatusCode, code: &str) -> Response {
        Response::json(status, &json!({ "code": code }))
    }
}
