//! Request identifiers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// A unique identifier for each request.
///
/// Eight cryptographically random bytes, rendered as URL-safe base64 without
/// padding (11 characters). The rendered form is what appears in the
/// `x-request-id` response header and in log records.
///
/// Randomness comes from the thread-local CSPRNG; if the operating system
/// cannot supply entropy the process aborts, since serving requests without
/// identifiers would silently break log correlation.
///
/// # Example
///
/// ```
/// use portico_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId([u8; 8]);

impl RequestId {
    /// Creates a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; 8];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Creates a `RequestId` from raw bytes.
    ///
    /// Useful in tests and when propagating an ID from another source.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", URL_SAFE_NO_PAD.encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_url_safe() {
        let id = RequestId::new();
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 11);
        assert!(rendered
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let id = RequestId::from_bytes([0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(id.as_bytes(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(id.to_string(), "AAECAwQFBgc");
    }
}
