//! # Portico Logging
//!
//! Request/response logging middleware with per-request leveled loggers.
//!
//! [`LoggingMiddleware`] assigns each request a random identifier, exposes it
//! via the `x-request-id` response header, attaches a [`RequestLogger`] to the
//! request context, and emits one record when the request starts and one when
//! the chain returns:
//!
//! ```text
//! REQ GET /users 10.0.0.9
//! RES GET /users 200 1.2ms 10.0.0.9
//! ```
//!
//! Handlers retrieve the logger with [`RequestLogger::from_context`]; records
//! they emit through it carry the same identifier and honor its severity
//! threshold. [`LevelOverrideMiddleware`] placed deeper in a chain swaps the
//! threshold for the remainder of that request, e.g. to turn on verbose
//! logging for a single noisy route.
//!
//! All records route through [`tracing`]; install a subscriber with
//! [`init_logging`] (or your own) to see them. Note that the subscriber's own
//! filter still applies on top of per-request thresholds, so a global `warn`
//! filter will suppress request records regardless of middleware settings.

#![doc(html_root_url = "https://docs.rs/portico-logging/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod logger;
pub mod middleware;
pub mod subscriber;

// Re-export main types at crate root
pub use logger::RequestLogger;
pub use middleware::{LevelOverrideMiddleware, LoggingBuilder, LoggingMiddleware, REQUEST_ID_HEADER};
pub use subscriber::{init_logging, InitError, LogConfig};

// Re-export the tracing types that appear in this crate's public API
pub use tracing::level_filters::LevelFilter;
pub use tracing::Level;
