//! Per-request logger handles.

use portico_core::{RequestContext, RequestId};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Emits a `tracing` event at a level only known at runtime.
///
/// `tracing::event!` requires its level in static metadata, so dispatch over
/// the five levels here.
macro_rules! dyn_event {
    ($lvl:expr, $($arg:tt)+) => {
        match $lvl {
            ::tracing::Level::TRACE => ::tracing::event!(::tracing::Level::TRACE, $($arg)+),
            ::tracing::Level::DEBUG => ::tracing::event!(::tracing::Level::DEBUG, $($arg)+),
            ::tracing::Level::INFO => ::tracing::event!(::tracing::Level::INFO, $($arg)+),
            ::tracing::Level::WARN => ::tracing::event!(::tracing::Level::WARN, $($arg)+),
            _ => ::tracing::event!(::tracing::Level::ERROR, $($arg)+),
        }
    };
}
pub(crate) use dyn_event;

/// A leveled logger scoped to a single request.
///
/// Carries the request identifier and a minimum severity threshold. Records
/// more verbose than the threshold are dropped by the handle before they
/// reach the subscriber; everything else is emitted as a [`tracing`] event
/// tagged with an `id` field.
///
/// The logging middleware creates one per request and stores it in the
/// [`RequestContext`]. Handlers fetch it back:
///
/// ```
/// use portico_core::RequestContext;
/// use portico_logging::RequestLogger;
///
/// fn handler(ctx: &RequestContext) {
///     let logger = RequestLogger::from_context(ctx);
///     logger.info("user created");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestLogger {
    /// Rendered request identifier, absent on the fallback logger.
    id: Option<Arc<str>>,
    /// Most verbose level this handle will emit.
    filter: LevelFilter,
}

impl RequestLogger {
    /// Creates a logger for the given request ID and severity threshold.
    #[must_use]
    pub fn new(id: RequestId, filter: LevelFilter) -> Self {
        Self {
            id: Some(Arc::from(id.to_string())),
            filter,
        }
    }

    /// The process-wide fallback logger: no request ID, TRACE threshold.
    ///
    /// Returned by [`Self::from_context`] when no logger was attached, e.g.
    /// outside any request or before the logging middleware ran.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            id: None,
            filter: LevelFilter::TRACE,
        }
    }

    /// Returns the logger attached to the context, or the fallback logger.
    #[must_use]
    pub fn from_context(ctx: &RequestContext) -> Self {
        ctx.get_extension::<Self>()
            .cloned()
            .unwrap_or_else(Self::fallback)
    }

    /// Attaches this logger to the context, replacing any prior logger for
    /// the remainder of the request's chain.
    pub fn attach(self, ctx: &mut RequestContext) {
        ctx.set_extension(self);
    }

    /// Returns the rendered request identifier, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the severity threshold.
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.filter
    }

    /// Returns a logger with the same identifier and a new threshold.
    #[must_use]
    pub fn with_level(&self, filter: LevelFilter) -> Self {
        Self {
            id: self.id.clone(),
            filter,
        }
    }

    /// Returns whether a record at `level` would be emitted by this handle.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.filter
    }

    /// Emits a record at the given level, tagged with the request identifier.
    pub fn log(&self, level: Level, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let id = self.id.as_deref().unwrap_or("-");
        dyn_event!(level, id = id, "{}", message);
    }

    /// Emits a TRACE record.
    pub fn trace(&self, message: &str) {
        self.log(Level::TRACE, message);
    }

    /// Emits a DEBUG record.
    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    /// Emits an INFO record.
    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Emits a WARN record.
    pub fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    /// Emits an ERROR record.
    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}
