//! Logging middleware stages.
//!
//! [`LoggingMiddleware`] wraps a request with a REQ/RES record pair and
//! attaches a [`RequestLogger`] to the context. [`LevelOverrideMiddleware`]
//! swaps the attached logger's threshold for the remainder of the chain.

use crate::logger::{dyn_event, RequestLogger};
use http_body::Body as _;
use portico_core::{BoxFuture, Middleware, Next, Request, RequestContext, RequestId, Response};
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that logs request starts and completions.
///
/// # Behavior
///
/// 1. Generate a fresh [`RequestId`], store it in the context
/// 2. Attach a [`RequestLogger`] carrying the ID and the configured threshold
/// 3. Emit the request record (`REQ <method> <path> <ip>`)
/// 4. Run the rest of the chain
/// 5. Emit the response record (`RES <method> <path> <status> <elapsed> <ip>`)
///    through whatever logger the chain left in the context, so downstream
///    level overrides apply to it
/// 6. Set `x-request-id` on the response
///
/// Both records are emitted even when a downstream stage short-circuits the
/// chain. The request record goes through the freshly attached logger, so a
/// threshold less verbose than the request record level drops it.
///
/// # Example
///
/// ```
/// use portico_logging::{LoggingMiddleware, Level, LevelFilter};
///
/// // Per-request loggers emit DEBUG and above; REQ records at the
/// // default TRACE level are therefore dropped, RES records kept.
/// let logging = LoggingMiddleware::new(LevelFilter::DEBUG);
///
/// // Same threshold, but emit both chain records at INFO.
/// let logging = LoggingMiddleware::builder(LevelFilter::DEBUG)
///     .request_level(Level::INFO)
///     .response_level(Level::INFO)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    /// Threshold carried by the per-request logger.
    level: LevelFilter,
    /// Severity of the request-start record.
    request_level: Level,
    /// Severity of the request-end record.
    response_level: Level,
}

impl LoggingMiddleware {
    /// Creates a logging middleware whose per-request loggers use the given
    /// severity threshold.
    ///
    /// Request records default to TRACE and response records to DEBUG.
    #[must_use]
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            request_level: Level::TRACE,
            response_level: Level::DEBUG,
        }
    }

    /// Creates a builder for more detailed configuration.
    #[must_use]
    pub fn builder(level: LevelFilter) -> LoggingBuilder {
        LoggingBuilder {
            level,
            request_level: Level::TRACE,
            response_level: Level::DEBUG,
        }
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let start = Instant::now();

            let request_id = RequestId::new();
            ctx.set_request_id(request_id);
            let id = request_id.to_string();

            let logger = RequestLogger::new(request_id, self.level);

            // Clone request info before passing ownership down the chain
            let method = request.method().to_string();
            let path = request.uri().path().to_string();
            let ip = client_ip(ctx, &request);
            let origin = request
                .headers()
                .get("origin")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if logger.enabled(self.request_level) {
                dyn_event!(
                    self.request_level,
                    id = id.as_str(),
                    method = method.as_str(),
                    path = path.as_str(),
                    ip = ip.as_str(),
                    origin = origin.as_str(),
                    "REQ {} {} {}",
                    method,
                    path,
                    ip
                );
            }

            logger.attach(ctx);

            let mut response = next.run(ctx, request).await;

            let elapsed = start.elapsed();
            let status = response.status();
            let bytes = response.body().size_hint().exact().unwrap_or(0);

            // Fetch the logger again: a downstream override must apply here
            let logger = RequestLogger::from_context(ctx);
            if logger.enabled(self.response_level) {
                dyn_event!(
                    self.response_level,
                    id = id.as_str(),
                    method = method.as_str(),
                    path = path.as_str(),
                    ip = ip.as_str(),
                    status = status.as_u16(),
                    bytes = bytes,
                    duration_ms = elapsed.as_secs_f64() * 1000.0,
                    "RES {} {} {} {:?} {}",
                    method,
                    path,
                    status.as_u16(),
                    elapsed,
                    ip
                );
            }

            response.headers_mut().insert(
                REQUEST_ID_HEADER,
                id.parse().expect("valid header value"),
            );

            response
        })
    }
}

/// Builder for [`LoggingMiddleware`].
#[derive(Debug)]
pub struct LoggingBuilder {
    level: LevelFilter,
    request_level: Level,
    response_level: Level,
}

impl LoggingBuilder {
    /// Sets the severity of the request-start record.
    #[must_use]
    pub fn request_level(mut self, level: Level) -> Self {
        self.request_level = level;
        self
    }

    /// Sets the severity of the request-end record.
    #[must_use]
    pub fn response_level(mut self, level: Level) -> Self {
        self.response_level = level;
        self
    }

    /// Builds the logging middleware.
    #[must_use]
    pub fn build(self) -> LoggingMiddleware {
        LoggingMiddleware {
            level: self.level,
            request_level: self.request_level,
            response_level: self.response_level,
        }
    }
}

/// Middleware that overrides the attached logger's severity threshold for
/// the remainder of the current request's chain.
///
/// The logger's request identifier is preserved; only the threshold changes.
/// Records emitted before this stage ran (including the request-start record)
/// are unaffected.
///
/// # Example
///
/// ```
/// use portico_logging::{LevelOverrideMiddleware, LevelFilter};
///
/// // Quiet down a chatty route: only WARN and above from here on
/// let quiet = LevelOverrideMiddleware::new(LevelFilter::WARN);
/// ```
#[derive(Debug, Clone)]
pub struct LevelOverrideMiddleware {
    level: LevelFilter,
}

impl LevelOverrideMiddleware {
    /// Creates an override middleware with the given threshold.
    #[must_use]
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Middleware for LevelOverrideMiddleware {
    fn name(&self) -> &'static str {
        "log_level"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            RequestLogger::from_context(ctx)
                .with_level(self.level)
                .attach(ctx);
            next.run(ctx, request).await
        })
    }
}

/// Best-effort client address, preferring proxy headers over the connection
/// peer address.
fn client_ip(ctx: &RequestContext, request: &Request) -> String {
    // X-Forwarded-For can contain multiple IPs, take the first
    if let Some(xff) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = xff.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            return value.to_string();
        }
    }
    match ctx.remote_addr() {
        Some(addr) => addr.ip().to_string(),
        None => "-".to_string(),
    }
}
