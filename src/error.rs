use std::fmt;

/// Errors that can occur while turning a Lambda event into a request.
#[derive(Debug)]
pub enum Error {
    /// The event does not describe an HTTP request
    InvalidEvent(InvalidEventError),
    /// The event text is not valid JSON
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidEvent(e) => write!(f, "Invalid event: {}", e),
            Error::Json(e) => write!(f, "Malformed event JSON: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidEvent(e) => Some(e),
            Error::Json(e) => Some(e),
        }
    }
}

impl From<InvalidEventError> for Error {
    fn from(e: InvalidEventError) -> Self {
        Error::InvalidEvent(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// The event cannot be normalized into an HTTP request.
///
/// This is the only failure of construction. Every accessor on a successfully
/// built [`HttpRequestEvent`](crate::HttpRequestEvent) is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEventError {
    /// Why the event was rejected
    pub kind: InvalidEventKind,
    /// Human-readable message explaining the rejection
    pub message: String,
}

impl InvalidEventError {
    /// Creates a new invalid event error.
    pub fn new(kind: InvalidEventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for InvalidEventError {}

/// The kind of invalid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEventKind {
    /// The event is not a JSON object
    NotAnObject,
    /// Neither `httpMethod` nor `requestContext.http.method` holds a method
    MissingMethod,
}

impl fmt::Display for InvalidEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidEventKind::NotAnObject => write!(f, "NotAnObject"),
            InvalidEventKind::MissingMethod => write!(f, "MissingMethod"),
        }
    }
}
