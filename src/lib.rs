//! Normalization of Lambda HTTP events into one canonical request.
//!
//! API Gateway REST APIs (payload format 1.0), HTTP APIs (payload format 2.0)
//! and Application Load Balancers all invoke Lambda functions with a JSON
//! description of an HTTP request, but each encodes query parameters,
//! headers and cookies its own way. This crate reconciles them:
//!
//! - **Query strings** are rebuilt from whichever of the four source shapes
//!   is present and re-encoded canonically, so the same request always
//!   yields the same query string.
//! - **Headers** are lower-cased, always multi-valued, and gain
//!   `content-type`, `content-length` and `cookie` where the event leaves
//!   them implicit.
//! - **Cookies**, body, path, client address and protocol are exposed
//!   through read-only accessors with documented defaults.
//!
//! # Core Types
//!
//! - [`HttpRequestEvent`]: The normalized, immutable request
//! - [`EventBuilder`]: Builder for requests with custom fallbacks
//! - [`Headers`]: Lower-cased multi-value headers
//! - [`query`]: PHP-style nested query string codec
//! - [`InvalidEventError`]: The event carries no HTTP method
//!
//! # Examples
//!
//! ```
//! use lambda_http_event::HttpRequestEvent;
//! use serde_json::json;
//!
//! let request = HttpRequestEvent::new(json!({
//!     "httpMethod": "POST",
//!     "path": "/orders",
//!     "requestContext": { "elb": { "targetGroupArn": "arn:aws:elasticloadbalancing:..." } },
//!     "multiValueQueryStringParameters": { "item[]": ["a", "b"] },
//!     "headers": { "X-Forwarded-Port": "443" },
//!     "body": "qty=2"
//! }))
//! .expect("event has a method");
//!
//! assert_eq!(request.uri(), "/orders?item%5B0%5D=a&item%5B1%5D=b");
//! assert_eq!(request.headers().first("content-length"), Some("5"));
//! assert_eq!(request.server_port(), 443);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cookie;
mod error;
mod event;
mod format;
mod headers;
mod logging;
pub mod query;
mod raw;
mod source;

pub use config::{EventBuilder, NormalizerConfig};
pub use cookie::Cookies;
pub use error::{Error, InvalidEventError, InvalidEventKind};
pub use event::HttpRequestEvent;
pub use format::PayloadFormat;
pub use headers::Headers;
pub use query::{QueryMap, QueryValue};
pub use raw::RawEvent;
