//! # Portico Bind
//!
//! Middleware that decodes a request's body or query parameters into a typed,
//! validated value and stores it in the request context for downstream
//! handlers.
//!
//! ## Construction
//!
//! [`Bind<T>`] allocates a fresh target per request; [`BindWithDefaults`]
//! calls a factory for a pre-populated base and merges the request data over
//! it, so absent input fields keep their defaults. An unsuitable target (not
//! deserializable, not validatable) is rejected by the compiler, never at
//! request time.
//!
//! ## Failure policies
//!
//! Decode and validation failures are routed through exactly one policy,
//! chosen in [`BindConfig`]:
//!
//! - [`FailurePolicy::Silent`] (default): continue the chain unchanged;
//!   nothing is stored and the client sees no error.
//! - [`FailurePolicy::Abort`]: short-circuit with the configured status and
//!   leave a [`BindFailure`] in the context for an outer error-handling
//!   middleware.
//! - [`FailurePolicy::Respond`]: short-circuit with a JSON error body.
//!
//! ## Example
//!
//! ```
//! use portico_bind::{Bind, BindConfig};
//! use portico_core::{Next, RequestContext, Response, ResponseExt};
//! use http::StatusCode;
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Debug, Deserialize, Validate)]
//! struct CreateUser {
//!     #[validate(length(min = 3))]
//!     name: String,
//!     #[validate(email)]
//!     email: String,
//! }
//!
//! let bind = Bind::<CreateUser>::with_config(
//!     BindConfig::respond(StatusCode::BAD_REQUEST).with_detail(),
//! );
//!
//! let handler = Next::handler(|ctx: &mut RequestContext, _req| {
//!     let user = ctx.get_extension::<CreateUser>().expect("bound by middleware");
//!     let _name = user.name.clone();
//!     Box::pin(async { Response::empty(StatusCode::CREATED) })
//! });
//!
//! let chain = Next::new(&bind, handler);
//! ```

#![doc(html_root_url = "https://docs.rs/portico-bind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod config;
mod error;

pub use bind::{Bind, BindWithDefaults};
pub use config::{BindConfig, FailurePolicy};
pub use error::{BindError, BindFailure};
