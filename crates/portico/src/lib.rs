//! # Portico
//!
//! **HTTP middleware helpers for async Rust handler chains**
//!
//! Portico provides three independent, opt-in middleware components:
//!
//! - **Logging** - per-request leveled loggers, request identifiers, and a
//!   REQ/RES record pair around every request
//! - **Binding** - decode and validate a request's body or query into a typed
//!   value, with configurable failure policies
//! - **Error responses** - a thin helper for aborting with small JSON error
//!   bodies, with detail exposure decided once at startup
//!
//! The components do not depend on each other; attach whichever a route
//! needs. The host framework owns routing and connections and drives a chain
//! of [`core::Middleware`] values per request.
//!
//! ## Quick Start
//!
//! ```
//! use portico::prelude::*;
//! use http::StatusCode;
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Debug, Deserialize, Validate)]
//! struct CreateUser {
//!     #[validate(length(min = 3))]
//!     name: String,
//! }
//!
//! # async fn demo() {
//! let logging = LoggingMiddleware::new(LevelFilter::DEBUG);
//! let bind = Bind::<CreateUser>::with_config(
//!     BindConfig::respond(StatusCode::BAD_REQUEST).with_detail(),
//! );
//!
//! let handler = Next::handler(|ctx: &mut RequestContext, _req| {
//!     let logger = RequestLogger::from_context(ctx);
//!     let user = ctx.get_extension::<CreateUser>().expect("bound");
//!     logger.info(&format!("creating user {}", user.name));
//!     Box::pin(async { Response::empty(StatusCode::CREATED) })
//! });
//!
//! let mut ctx = RequestContext::new();
//! let request: Request = http::Request::builder()
//!     .method("POST")
//!     .uri("/users")
//!     .header("content-type", "application/json")
//!     .body(http_body_util::Full::new(bytes::Bytes::from(r#"{"name":"alice"}"#)))
//!     .unwrap();
//!
//! let chain = Next::new(&logging, Next::new(&bind, handler));
//! let response = chain.run(&mut ctx, request).await;
//! assert_eq!(response.status(), StatusCode::CREATED);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/portico/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use portico_core as core;

// Re-export the logging helpers
pub use portico_logging as logging;

// Re-export the binding helpers
pub use portico_bind as bind;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use portico_bind::{Bind, BindConfig, BindError, BindFailure, BindWithDefaults, FailurePolicy};
    pub use portico_core::{
        BoxFuture, ErrorResponder, FnMiddleware, Middleware, Next, NoDetail, Request,
        RequestContext, RequestId, Response, ResponseExt,
    };
    pub use portico_logging::{
        init_logging, Level, LevelFilter, LevelOverrideMiddleware, LogConfig, LoggingMiddleware,
        RequestLogger,
    };
}
