//! Core middleware trait and chain types.
//!
//! This module defines the [`Middleware`] trait that all Portico helpers
//! implement. Middleware processes requests before they reach handlers and
//! responses after handlers complete.
//!
//! Unlike a framework with a fixed pipeline, Portico helpers are independent
//! and opt-in: the host assembles whichever chain a route needs by nesting
//! [`Next`] values, innermost handler first.
//!
//! # Example
//!
//! ```
//! use portico_core::{BoxFuture, Middleware, Next, Request, RequestContext, Response, ResponseExt};
//! use http::StatusCode;
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut RequestContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let start = std::time::Instant::now();
//!             let response = next.run(ctx, request).await;
//!             let _elapsed = start.elapsed();
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::RequestContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core middleware trait.
///
/// Middleware receives a mutable per-request context, the incoming request,
/// and a [`Next`] continuation for the rest of the chain.
///
/// # Invariants
///
/// - Middleware MUST call `next.run()` exactly once, unless it
///   short-circuits by returning its own response
/// - Middleware SHOULD NOT suppress responses produced downstream
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Process the request through this middleware.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The mutable per-request context
    /// * `request` - The incoming HTTP request
    /// * `next` - Continuation invoking the rest of the chain
    ///
    /// # Returns
    ///
    /// The HTTP response (either from downstream or generated here)
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation invoking the next middleware in the chain.
///
/// This type is passed to middleware and must be called (exactly once)
/// to continue processing. If not called, the middleware short-circuits
/// the chain and returns its own response.
pub struct Next<'a> {
    /// The remaining middleware chain
    inner: NextInner<'a>,
}

/// Internal representation of the remaining chain.
enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the handler
    Handler(Box<dyn FnOnce(&mut RequestContext, Request) -> BoxFuture<'static, Response> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given middleware, then `next`.
    ///
    /// Chains are assembled innermost-first: wrap the terminal
    /// [`Next::handler`] with each middleware from the inside out.
    #[must_use]
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or handler in the chain.
    ///
    /// This consumes `self` to ensure it can only be called once.
    pub async fn run(self, ctx: &mut RequestContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(ctx, request, *next).await
            }
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A middleware that can be created from an async function.
///
/// This allows defining simple middleware without implementing the trait
/// directly. The returned future must be `'static`, so this suits stages
/// that decide up front and short-circuit; implement [`Middleware`] for
/// stages that need the context or request after awaiting downstream.
///
/// # Example
///
/// ```rust,ignore
/// let maintenance = FnMiddleware::new("maintenance", |_ctx, _req, _next| async {
///     Response::empty(StatusCode::SERVICE_UNAVAILABLE)
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(&mut RequestContext, Request, Next<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move { (self.func)(ctx, request, next).await })
    }
}
