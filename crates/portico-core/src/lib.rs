//! # Portico Core
//!
//! Core types for the Portico middleware helpers.
//!
//! This crate provides the handler-chain seam the helper crates plug into:
//!
//! - [`Middleware`] / [`Next`] - the chain contract and its continuation
//! - [`RequestContext`] - per-request scope with typed extension storage
//! - [`Request`] / [`Response`] - buffered-body HTTP types
//! - [`RequestId`] - random, URL-safe request identifier
//! - [`ErrorResponder`] - thin JSON error-response helper
//!
//! Portico does not route requests or own connections. A host framework
//! constructs one [`RequestContext`] per request, assembles a chain with
//! [`Next`], and runs it:
//!
//! ```
//! use portico_core::{Next, Request, RequestContext, Response, ResponseExt};
//! use http::StatusCode;
//!
//! # async fn demo() {
//! let mut ctx = RequestContext::new();
//! let request: Request = http::Request::builder()
//!     .uri("/health")
//!     .body(http_body_util::Full::new(bytes::Bytes::new()))
//!     .unwrap();
//!
//! let chain = Next::handler(|_ctx, _req| {
//!     Box::pin(async { Response::empty(StatusCode::OK) })
//! });
//!
//! let response = chain.run(&mut ctx, request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod request_id;
pub mod respond;
pub mod types;

// Re-export main types at crate root
pub use context::RequestContext;
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use request_id::RequestId;
pub use respond::{ErrorResponder, NoDetail};
pub use types::{Request, Response, ResponseExt};
