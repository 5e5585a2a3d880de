use std::fmt;

/// Placeholder request ID for events without `requestContext.requestId`.
pub(crate) const UNKNOWN_REQUEST_ID: &str = "-";

/// Logging interface bound to a single event.
///
/// Every record carries the event's request ID so diagnostics from
/// concurrent invocations can be told apart. The library only emits
/// records; installing a subscriber is up to the caller.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventLog<'a> {
    request_id: &'a str,
}

impl<'a> EventLog<'a> {
    /// Creates a logger for the given request ID.
    pub(crate) fn new(request_id: Option<&'a str>) -> Self {
        Self {
            request_id: request_id.unwrap_or(UNKNOWN_REQUEST_ID),
        }
    }

    /// Logs a warning-level message with request ID.
    pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}
