//! Binding error types.

use thiserror::Error;
use validator::ValidationErrors;

/// Error that occurs while binding a request into a typed value.
#[derive(Debug, Error)]
pub enum BindError {
    /// The JSON body could not be deserialized into the target.
    #[error("failed to decode json body: {0}")]
    Json(#[from] serde_json::Error),

    /// The query string or form body could not be deserialized.
    #[error("failed to decode form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The factory's default value could not be re-encoded for merging.
    #[error("failed to encode binding defaults: {0}")]
    Defaults(String),

    /// The request carried a body with a content type the binder does not
    /// decode.
    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// The decoded value violated its field-level validation constraints.
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
}

impl BindError {
    /// Returns the validation errors if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Marker stored in the request context by the Abort failure policy.
///
/// An outer error-handling middleware can retrieve it to decide what response
/// to write:
///
/// ```
/// use portico_bind::BindFailure;
/// use portico_core::RequestContext;
///
/// fn inspect(ctx: &RequestContext) {
///     if let Some(failure) = ctx.get_extension::<BindFailure>() {
///         eprintln!("binding failed: {}", failure.error());
///     }
/// }
/// ```
#[derive(Debug)]
pub struct BindFailure(pub BindError);

impl BindFailure {
    /// Returns the underlying binding error.
    #[must_use]
    pub fn error(&self) -> &BindError {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_decoder_text() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let bind_err = BindError::from(err);
        assert!(bind_err.to_string().starts_with("failed to decode json body:"));
    }

    #[test]
    fn test_validation_errors_accessor() {
        let err = BindError::UnsupportedMediaType("text/plain".to_string());
        assert!(err.validation_errors().is_none());

        let err = BindError::Validation(ValidationErrors::new());
        assert!(err.validation_errors().is_some());
    }
}
