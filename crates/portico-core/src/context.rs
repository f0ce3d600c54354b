//! Per-request context.
//!
//! The [`RequestContext`] is the request-scoped storage the middleware
//! helpers decorate. The host framework creates one per request, threads it
//! through the chain, and drops it when the request completes.

use crate::request_id::RequestId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

/// Context that flows through the handler chain.
///
/// The context is mutable during processing, allowing each middleware to
/// enrich it with extracted information (request id, logger, bound payloads).
/// Nothing stored here outlives the request.
///
/// # Example
///
/// ```
/// use portico_core::RequestContext;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Tenant(String);
///
/// let mut ctx = RequestContext::new();
/// ctx.set_extension(Tenant("acme".to_string()));
///
/// assert_eq!(ctx.get_extension::<Tenant>(), Some(&Tenant("acme".to_string())));
/// ```
#[derive(Debug)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// Peer address of the underlying connection, if the host knows it.
    remote_addr: Option<SocketAddr>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data.
    ///
    /// Middleware can store arbitrary data here using type-safe keys: the
    /// stored value's own type is the key, so retrieval is always typed.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            remote_addr: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a context with a specific request ID.
    ///
    /// Useful when the ID was assigned by an upstream service.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            remote_addr: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    ///
    /// This should only be called by the logging middleware.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the peer address, if known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Sets the peer address.
    ///
    /// Hosts set this when constructing the context from a connection.
    pub fn set_remote_addr(&mut self, addr: SocketAddr) {
        self.remote_addr = Some(addr);
    }

    /// Returns a context with the peer address set.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous value of the
    /// same type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    ///
    /// Returns `None` if no extension of the given type was stored.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RequestContext {
    fn clone(&self) -> Self {
        // Note: Extensions are not cloned - they don't implement Clone
        Self {
            request_id: self.request_id,
            remote_addr: self.remote_addr,
            started_at: self.started_at,
            extensions: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_request_id() {
        let ctx = RequestContext::new();
        assert!(!ctx.request_id().to_string().is_empty());
    }

    #[test]
    fn test_set_request_id() {
        let mut ctx = RequestContext::new();
        let id = RequestId::new();
        ctx.set_request_id(id);
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn test_remote_addr() {
        let addr: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let ctx = RequestContext::new().with_remote_addr(addr);
        assert_eq!(ctx.remote_addr(), Some(addr));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct MyExtension {
            value: i32,
        }

        let mut ctx = RequestContext::new();

        // Initially no extension
        assert!(!ctx.has_extension::<MyExtension>());
        assert!(ctx.get_extension::<MyExtension>().is_none());

        // Set extension
        ctx.set_extension(MyExtension { value: 42 });
        assert!(ctx.has_extension::<MyExtension>());
        assert_eq!(
            ctx.get_extension::<MyExtension>(),
            Some(&MyExtension { value: 42 })
        );

        // Replace extension
        ctx.set_extension(MyExtension { value: 7 });
        assert_eq!(
            ctx.get_extension::<MyExtension>(),
            Some(&MyExtension { value: 7 })
        );

        // Remove extension
        let removed = ctx.remove_extension::<MyExtension>();
        assert_eq!(removed, Some(MyExtension { value: 7 }));
        assert!(!ctx.has_extension::<MyExtension>());
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = RequestContext::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn test_clone_drops_extensions() {
        let mut ctx = RequestContext::new();
        ctx.set_extension(1u32);

        let cloned = ctx.clone();
        assert_eq!(cloned.request_id(), ctx.request_id());
        assert!(!cloned.has_extension::<u32>());
    }
}
