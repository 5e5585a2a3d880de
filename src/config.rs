use serde_json::Value;

use crate::error::InvalidEventError;
use crate::event::HttpRequestEvent;

/// Fallback values used when an event leaves a field out.
///
/// The defaults mirror what a plain HTTP server would report for a local
/// request. Use [`EventBuilder`] to override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Client address when the request context carries none
    pub default_source_ip: String,
    /// Server name when there is no `Host` header
    pub default_server_name: String,
    /// Port when there is no `X-Forwarded-Port` header
    pub default_server_port: u16,
    /// `Content-Type` synthesized for a body sent without one
    pub fallback_content_type: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_source_ip: "127.0.0.1".to_string(),
            default_server_name: "localhost".to_string(),
            default_server_port: 80,
            fallback_content_type: "application/x-www-form-urlencoded".to_string(),
        }
    }
}

/// Builder for an [`HttpRequestEvent`] with custom fallbacks.
///
/// # Examples
///
/// ```
/// use lambda_http_event::EventBuilder;
/// use serde_json::json;
///
/// let request = EventBuilder::new(json!({ "httpMethod": "post", "body": "{}" }))
///     .default_source_ip("0.0.0.0")
///     .fallback_content_type("application/json")
///     .build()
///     .expect("event has a method");
///
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.source_ip(), "0.0.0.0");
/// assert_eq!(request.content_type(), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: Value,
    config: NormalizerConfig,
}

impl EventBuilder {
    /// Creates a builder for the given event with default fallbacks.
    pub fn new(event: Value) -> Self {
        Self {
            event,
            config: NormalizerConfig::default(),
        }
    }

    /// Replaces all fallbacks at once.
    pub fn config(mut self, config: NormalizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the client address reported when the event has none.
    pub fn default_source_ip(mut self, ip: impl Into<String>) -> Self {
        self.config.default_source_ip = ip.into();
        self
    }

    /// Sets the server name reported when there is no `Host` header.
    pub fn default_server_name(mut self, name: impl Into<String>) -> Self {
        self.config.default_server_name = name.into();
        self
    }

    /// Sets the port reported when there is no `X-Forwarded-Port` header.
    pub fn default_server_port(mut self, port: u16) -> Self {
        self.config.default_server_port = port;
        self
    }

    /// Sets the `Content-Type` synthesized for bodies sent without one.
    pub fn fallback_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.fallback_content_type = content_type.into();
        self
    }

    /// Normalizes the event.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidEventError` if the event has no HTTP method.
    pub fn build(self) -> Result<HttpRequestEvent, InvalidEventError> {
        HttpRequestEvent::with_config(self.event, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidEventKind;
    use serde_json::json;

    #[test]
    fn defaults_match_local_server() {
        let config = NormalizerConfig::default();
        assert_eq!(config.default_source_ip, "127.0.0.1");
        assert_eq!(config.default_server_name, "localhost");
        assert_eq!(config.default_server_port, 80);
        assert_eq!(
            config.fallback_content_type,
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn setters_override_defaults() {
        let request = EventBuilder::new(json!({"httpMethod": "GET"}))
            .default_server_name("example.test")
            .default_server_port(8080)
            .build()
            .unwrap();

        assert_eq!(request.server_name(), "example.test");
        assert_eq!(request.server_port(), 8080);
        assert_eq!(request.source_ip(), "127.0.0.1");
    }

    #[test]
    fn config_replaces_everything() {
        let config = NormalizerConfig {
            default_source_ip: "10.1.1.1".to_string(),
            ..NormalizerConfig::default()
        };
        let request = EventBuilder::new(json!({"httpMethod": "GET"}))
            .config(config)
            .build()
            .unwrap();

        assert_eq!(request.source_ip(), "10.1.1.1");
    }

    #[test]
    fn build_rejects_events_without_method() {
        let err = EventBuilder::new(json!({"path": "/"})).build().unwrap_err();
        assert_eq!(err.kind, InvalidEventKind::MissingMethod);
    }
}
