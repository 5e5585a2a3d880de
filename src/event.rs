use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use serde_json::Value;

use crate::config::{EventBuilder, NormalizerConfig};
use crate::cookie::{self, Cookies, COOKIE_SEPARATOR};
use crate::error::{Error, InvalidEventError, InvalidEventKind};
use crate::format::PayloadFormat;
use crate::headers::Headers;
use crate::logging::EventLog;
use crate::query::{self, QueryMap};
use crate::raw::{scalar_text, text_list, RawEvent};
use crate::source::QuerySource;

const DEFAULT_PATH: &str = "/";
const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

static NULL: Value = Value::Null;

/// An HTTP request normalized from an API Gateway or ALB Lambda event.
///
/// The three supported event shapes (REST API payload 1.0, HTTP API payload
/// 2.0 and ALB) encode query parameters, headers and cookies differently.
/// `HttpRequestEvent` reconciles them once, at construction, into:
/// - an upper-cased method,
/// - a canonical, consistently percent-encoded query string,
/// - lower-cased multi-value headers with `content-type`, `content-length`
///   and (for 2.0) `cookie` filled in.
///
/// Everything else is read from the event on demand. The request is
/// immutable; all accessors are infallible.
///
/// # Examples
///
/// ```
/// use lambda_http_event::{HttpRequestEvent, PayloadFormat};
/// use serde_json::json;
///
/// let request = HttpRequestEvent::new(json!({
///     "version": "2.0",
///     "rawPath": "/users",
///     "rawQueryString": "page=2&filter[role]=admin",
///     "cookies": ["session=abc"],
///     "headers": { "Host": "api.example.com" },
///     "requestContext": { "http": { "method": "get", "sourceIp": "203.0.113.9" } }
/// }))
/// .expect("event has a method");
///
/// assert_eq!(request.payload_format(), PayloadFormat::V2);
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.uri(), "/users?page=2&filter%5Brole%5D=admin");
/// assert_eq!(request.headers()["cookie"], ["session=abc".to_string()]);
/// assert_eq!(request.source_ip(), "203.0.113.9");
/// assert_eq!(request.server_name(), "api.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequestEvent {
    event: RawEvent,
    method: String,
    format: PayloadFormat,
    query_string: String,
    headers: Headers,
    body: Vec<u8>,
    config: NormalizerConfig,
}

impl HttpRequestEvent {
    /// Normalizes an event with the default fallbacks.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidEventError` if the event is not an object or has
    /// no method in either `httpMethod` or `requestContext.http.method`.
    pub fn new(event: Value) -> Result<Self, InvalidEventError> {
        Self::with_config(event, NormalizerConfig::default())
    }

    /// Parses and normalizes an event from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed JSON and `Error::InvalidEvent`
    /// if the document is not an HTTP event.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let event: Value = serde_json::from_str(json)?;
        Ok(Self::new(event)?)
    }

    /// Starts a builder to normalize an event with custom fallbacks.
    pub fn builder(event: Value) -> EventBuilder {
        EventBuilder::new(event)
    }

    pub(crate) fn with_config(
        event: Value,
        config: NormalizerConfig,
    ) -> Result<Self, InvalidEventError> {
        let event = RawEvent::new(event);
        let method = method_of(&event)?;
        let format = PayloadFormat::detect(&event);
        let log = EventLog::new(event.str("/requestContext/requestId"));

        let source = QuerySource::select(&event, format);
        let query_string = source.canonicalize();
        log.debug(format_args!(
            "{method} event in payload format {format}, query from {}",
            source.name()
        ));

        let body = decode_body(&event, &log);
        let headers = normalize_headers(&event, format, &body, &config, &log);

        Ok(Self {
            event,
            method,
            format,
            query_string,
            headers,
            body,
            config,
        })
    }

    // ========================================================================
    // Request line
    // ========================================================================

    /// Returns the upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request path without the query string.
    ///
    /// 2.0 events use `rawPath`, 1.0 and ALB events use `path`, defaulting
    /// to `/`. The stage-prefixed `requestContext.path` is not consulted.
    pub fn path(&self) -> &str {
        let pointer = match self.format {
            PayloadFormat::V2 => "/rawPath",
            PayloadFormat::V1 => "/path",
        };
        self.event.str(pointer).unwrap_or(DEFAULT_PATH)
    }

    /// Returns the path followed by `?` and the query string, if any.
    pub fn uri(&self) -> String {
        if self.query_string.is_empty() {
            self.path().to_owned()
        } else {
            format!("{}?{}", self.path(), self.query_string)
        }
    }

    /// Returns the canonical query string, without a leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the query parameters decoded from the canonical query string.
    pub fn query_parameters(&self) -> QueryMap {
        query::decode(&self.query_string)
    }

    /// Returns the path parameters matched by API Gateway.
    pub fn path_parameters(&self) -> IndexMap<String, String> {
        self.event
            .object("/pathParameters")
            .map(|params| {
                params
                    .iter()
                    .filter_map(|(name, value)| scalar_text(value).map(|text| (name.clone(), text)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the `requestContext.protocol` value, `HTTP/1.1` by default.
    pub fn protocol(&self) -> &str {
        self.event
            .str("/requestContext/protocol")
            .unwrap_or(DEFAULT_PROTOCOL)
    }

    /// Returns the protocol version, e.g. `1.1` for `HTTP/1.1`.
    pub fn protocol_version(&self) -> &str {
        let protocol = self.protocol();
        match protocol.rsplit_once('/') {
            Some((_, version)) => version,
            None => protocol,
        }
    }

    // ========================================================================
    // Headers, cookies and body
    // ========================================================================

    /// Returns the normalized headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns `true` if the headers arrived as multi-value headers.
    ///
    /// Always `false` for 2.0 events.
    pub fn has_multi_header(&self) -> bool {
        !self.format.is_v2() && self.event.contains("/multiValueHeaders")
    }

    /// Returns the first `Content-Type` value.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.first("content-type")
    }

    /// Returns the request cookies.
    ///
    /// 2.0 events read the top-level `cookies` array, other events the
    /// `Cookie` header. Entries without `=` are skipped.
    pub fn cookies(&self) -> Cookies {
        let log = self.log();
        match self.format {
            PayloadFormat::V2 => match self.event.get("/cookies").and_then(Value::as_array) {
                Some(entries) => cookie::from_entries(entries.iter().filter_map(Value::as_str), &log),
                None => Cookies::new(),
            },
            PayloadFormat::V1 => match self.headers.get("cookie") {
                Some(values) => cookie::from_header_values(values.iter().map(String::as_str), &log),
                None => Cookies::new(),
            },
        }
    }

    /// Returns the request body, base64-decoded if `isBase64Encoded` is set.
    ///
    /// The body is decoded once, when the request is built.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the request body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    // ========================================================================
    // Client and server
    // ========================================================================

    /// Returns the client IP address.
    pub fn source_ip(&self) -> &str {
        let pointer = match self.format {
            PayloadFormat::V2 => "/requestContext/http/sourceIp",
            PayloadFormat::V1 => "/requestContext/identity/sourceIp",
        };
        self.event
            .str(pointer)
            .unwrap_or(&self.config.default_source_ip)
    }

    /// Returns the `Host` header, or the configured server name.
    pub fn server_name(&self) -> &str {
        self.headers
            .first("host")
            .unwrap_or(&self.config.default_server_name)
    }

    /// Returns the `X-Forwarded-Port` header, or the configured port.
    pub fn server_port(&self) -> u16 {
        self.forwarded_port()
    }

    /// Returns the client-side port as forwarded by the gateway.
    pub fn remote_port(&self) -> u16 {
        self.forwarded_port()
    }

    fn forwarded_port(&self) -> u16 {
        self.headers
            .first("x-forwarded-port")
            .and_then(|port| port.trim().parse().ok())
            .unwrap_or(self.config.default_server_port)
    }

    // ========================================================================
    // Event metadata
    // ========================================================================

    /// Returns the payload format of the event.
    pub fn payload_format(&self) -> PayloadFormat {
        self.format
    }

    /// Returns `true` for payload format 2.0.
    pub fn is_format_v2(&self) -> bool {
        self.format.is_v2()
    }

    /// Returns `true` if the event came from an Application Load Balancer.
    pub fn is_load_balancer(&self) -> bool {
        self.event.contains("/requestContext/elb")
    }

    /// Returns `requestContext.requestId`.
    pub fn request_id(&self) -> Option<&str> {
        self.event.str("/requestContext/requestId")
    }

    /// Returns the raw `requestContext`, or `null` if absent.
    pub fn request_context(&self) -> &Value {
        self.event.get("/requestContext").unwrap_or(&NULL)
    }

    /// Returns the event this request was built from.
    pub fn raw_event(&self) -> &RawEvent {
        &self.event
    }

    fn log(&self) -> EventLog<'_> {
        EventLog::new(self.request_id())
    }
}

impl TryFrom<Value> for HttpRequestEvent {
    type Error = InvalidEventError;

    fn try_from(event: Value) -> Result<Self, Self::Error> {
        Self::new(event)
    }
}

fn method_of(event: &RawEvent) -> Result<String, InvalidEventError> {
    if !event.as_value().is_object() {
        return Err(InvalidEventError::new(
            InvalidEventKind::NotAnObject,
            "event is not a JSON object",
        ));
    }

    let present = |method: &&str| !method.trim().is_empty();
    event
        .str("/httpMethod")
        .filter(present)
        .or_else(|| event.str("/requestContext/http/method").filter(present))
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| {
            InvalidEventError::new(
                InvalidEventKind::MissingMethod,
                "event has neither `httpMethod` nor `requestContext.http.method`",
            )
        })
}

fn decode_body(event: &RawEvent, log: &EventLog<'_>) -> Vec<u8> {
    let body = event.str("/body").unwrap_or("");
    if event.bool("/isBase64Encoded") != Some(true) {
        return body.as_bytes().to_vec();
    }

    match STANDARD.decode(body) {
        Ok(bytes) => bytes,
        Err(err) => {
            log.warn(format_args!(
                "body is flagged as base64 but does not decode ({err}), using it verbatim"
            ));
            body.as_bytes().to_vec()
        }
    }
}

fn normalize_headers(
    event: &RawEvent,
    format: PayloadFormat,
    body: &[u8],
    config: &NormalizerConfig,
    log: &EventLog<'_>,
) -> Headers {
    let mut headers = Headers::default();

    if let Some(multi) = event.object("/multiValueHeaders") {
        for (name, values) in multi {
            headers.append(name, text_list(values));
        }
    } else if let Some(single) = event.object("/headers") {
        for (name, value) in single {
            headers.append(name, scalar_text(value));
        }
    }

    if !body.is_empty() {
        if !headers.contains("content-type") {
            log.debug(format_args!(
                "no content-type for a {} byte body, assuming {}",
                body.len(),
                config.fallback_content_type
            ));
            headers.set("content-type", config.fallback_content_type.clone());
        }
        if !headers.contains("content-length") {
            headers.set("content-length", body.len().to_string());
        }
    }

    if format.is_v2() {
        let cookies: Vec<String> = event
            .get("/cookies")
            .map(text_list)
            .unwrap_or_default();
        if !cookies.is_empty() {
            headers.set("cookie", cookies.join(COOKIE_SEPARATOR));
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> HttpRequestEvent {
        HttpRequestEvent::new(value).expect("valid event")
    }

    #[test]
    fn rejects_non_objects() {
        let err = HttpRequestEvent::new(json!(["GET"])).unwrap_err();
        assert_eq!(err.kind, InvalidEventKind::NotAnObject);
    }

    #[test]
    fn rejects_missing_or_blank_method() {
        for event in [
            json!({}),
            json!({"httpMethod": null}),
            json!({"httpMethod": ""}),
            json!({"httpMethod": 7}),
            json!({"requestContext": {"http": {}}}),
        ] {
            let err = HttpRequestEvent::new(event).unwrap_err();
            assert_eq!(err.kind, InvalidEventKind::MissingMethod);
        }
    }

    #[test]
    fn method_is_upper_cased_from_either_location() {
        assert_eq!(request(json!({"httpMethod": "patch"})).method(), "PATCH");
        assert_eq!(
            request(json!({"requestContext": {"http": {"method": "delete"}}})).method(),
            "DELETE"
        );
    }

    #[test]
    fn blank_v1_method_falls_back_to_v2_location() {
        let req = request(json!({
            "httpMethod": " ",
            "requestContext": {"http": {"method": "put"}}
        }));
        assert_eq!(req.method(), "PUT");
    }

    #[test]
    fn path_defaults_and_ignores_stage_path() {
        let v1 = request(json!({
            "httpMethod": "GET",
            "requestContext": {"path": "/prod/items"}
        }));
        assert_eq!(v1.path(), "/");

        let v1 = request(json!({
            "httpMethod": "GET",
            "path": "/items",
            "requestContext": {"path": "/prod/items"}
        }));
        assert_eq!(v1.path(), "/items");

        let v2 = request(json!({
            "version": "2.0",
            "path": "/ignored",
            "requestContext": {"http": {"method": "GET"}}
        }));
        assert_eq!(v2.path(), "/");
    }

    #[test]
    fn uri_appends_query_string_only_when_present() {
        let plain = request(json!({"httpMethod": "GET", "path": "/a"}));
        assert_eq!(plain.uri(), "/a");

        let query = request(json!({
            "httpMethod": "GET",
            "path": "/a",
            "queryStringParameters": {"x": "1"}
        }));
        assert_eq!(query.uri(), "/a?x=1");
    }

    #[test]
    fn protocol_and_version() {
        let default = request(json!({"httpMethod": "GET"}));
        assert_eq!(default.protocol(), "HTTP/1.1");
        assert_eq!(default.protocol_version(), "1.1");

        let h2 = request(json!({"httpMethod": "GET", "requestContext": {"protocol": "HTTP/2.0"}}));
        assert_eq!(h2.protocol_version(), "2.0");

        let bare = request(json!({"httpMethod": "GET", "requestContext": {"protocol": "2"}}));
        assert_eq!(bare.protocol_version(), "2");
    }

    #[test]
    fn body_is_base64_decoded_when_flagged() {
        let req = request(json!({
            "httpMethod": "POST",
            "body": "aGVsbG8=",
            "isBase64Encoded": true
        }));
        assert_eq!(req.body(), b"hello");
        assert_eq!(req.headers()["content-length"], ["5".to_string()]);
    }

    #[test]
    fn invalid_base64_body_is_used_verbatim() {
        let req = request(json!({
            "httpMethod": "POST",
            "body": "not base64!",
            "isBase64Encoded": true
        }));
        assert_eq!(req.body_text(), "not base64!");
    }

    #[test]
    fn body_is_decoded_once_and_kept() {
        let req = request(json!({
            "httpMethod": "POST",
            "body": "AAEC",
            "isBase64Encoded": true
        }));
        let first = req.body().as_ptr();
        assert_eq!(req.body(), [0u8, 1, 2]);
        assert_eq!(req.body().as_ptr(), first);
        assert_eq!(req.body_text(), "\u{0}\u{1}\u{2}");
    }

    #[test]
    fn v2_cookie_values_turn_plus_into_space() {
        let req = request(json!({
            "version": "2.0",
            "cookies": ["q=a+b"],
            "requestContext": {"http": {"method": "GET"}}
        }));
        assert_eq!(req.cookies()["q"], "a b");
    }

    #[test]
    fn empty_body_synthesizes_nothing() {
        let req = request(json!({"httpMethod": "GET", "body": ""}));
        assert!(req.headers().is_empty());
        assert!(req.body().is_empty());
    }

    #[test]
    fn existing_content_headers_are_kept() {
        let req = request(json!({
            "httpMethod": "POST",
            "body": "{}",
            "headers": {"Content-Type": "application/json", "Content-Length": "2"}
        }));
        assert_eq!(req.content_type(), Some("application/json"));
        assert_eq!(req.headers()["content-length"], ["2".to_string()]);
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let req = request(json!({"httpMethod": "POST", "body": "é"}));
        assert_eq!(req.headers().first("content-length"), Some("2"));
    }

    #[test]
    fn multi_value_headers_win_over_headers() {
        let req = request(json!({
            "httpMethod": "GET",
            "headers": {"Accept": "b"},
            "multiValueHeaders": {"Accept": ["a", "b"]}
        }));
        assert!(req.has_multi_header());
        assert_eq!(req.headers()["accept"], ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn v2_never_reports_multi_headers() {
        let req = request(json!({
            "version": "2.0",
            "multiValueHeaders": {"a": ["1"]},
            "requestContext": {"http": {"method": "GET"}}
        }));
        assert!(!req.has_multi_header());
    }

    #[test]
    fn v1_cookies_come_from_the_header() {
        let req = request(json!({
            "httpMethod": "GET",
            "headers": {"Cookie": "a=1; b=hello%20world"}
        }));
        let cookies = req.cookies();
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "hello world");
    }

    #[test]
    fn v1_without_cookie_header_has_no_cookies() {
        assert!(request(json!({"httpMethod": "GET"})).cookies().is_empty());
    }

    #[test]
    fn v2_empty_cookie_list_sets_no_header() {
        let req = request(json!({
            "version": "2.0",
            "cookies": [],
            "requestContext": {"http": {"method": "GET"}}
        }));
        assert!(!req.headers().contains("cookie"));
        assert!(req.cookies().is_empty());
    }

    #[test]
    fn v2_cookies_replace_cookie_header() {
        let req = request(json!({
            "version": "2.0",
            "cookies": ["a=1"],
            "headers": {"cookie": "stale=1"},
            "requestContext": {"http": {"method": "GET"}}
        }));
        assert_eq!(req.headers()["cookie"], ["a=1".to_string()]);
    }

    #[test]
    fn source_ip_per_format_with_default() {
        let v1 = request(json!({
            "httpMethod": "GET",
            "requestContext": {"identity": {"sourceIp": "1.2.3.4"}}
        }));
        assert_eq!(v1.source_ip(), "1.2.3.4");

        let v2 = request(json!({
            "version": "2.0",
            "requestContext": {"http": {"method": "GET", "sourceIp": "5.6.7.8"}}
        }));
        assert_eq!(v2.source_ip(), "5.6.7.8");

        assert_eq!(request(json!({"httpMethod": "GET"})).source_ip(), "127.0.0.1");
    }

    #[test]
    fn server_details_come_from_headers() {
        let req = request(json!({
            "httpMethod": "GET",
            "headers": {"Host": "example.org", "X-Forwarded-Port": "443"}
        }));
        assert_eq!(req.server_name(), "example.org");
        assert_eq!(req.server_port(), 443);
        assert_eq!(req.remote_port(), 443);

        let bare = request(json!({"httpMethod": "GET", "headers": {"X-Forwarded-Port": "x"}}));
        assert_eq!(bare.server_name(), "localhost");
        assert_eq!(bare.server_port(), 80);
    }

    #[test]
    fn path_parameters_are_stringified() {
        let req = request(json!({
            "httpMethod": "GET",
            "pathParameters": {"id": "42", "n": 7, "gone": null}
        }));
        let params = req.path_parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(params["id"], "42");
        assert_eq!(params["n"], "7");
        assert!(request(json!({"httpMethod": "GET"})).path_parameters().is_empty());
    }

    #[test]
    fn request_context_and_metadata() {
        let req = request(json!({
            "httpMethod": "GET",
            "requestContext": {"requestId": "abc", "elb": {"targetGroupArn": "arn"}}
        }));
        assert_eq!(req.request_id(), Some("abc"));
        assert!(req.is_load_balancer());
        assert!(req.request_context().is_object());
        assert!(!req.is_format_v2());

        let bare = request(json!({"httpMethod": "GET"}));
        assert!(bare.request_context().is_null());
        assert_eq!(bare.request_id(), None);
    }

    #[test]
    fn from_json_str_reports_both_failures() {
        assert!(matches!(
            HttpRequestEvent::from_json_str("{"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            HttpRequestEvent::from_json_str("{}"),
            Err(Error::InvalidEvent(_))
        ));
        let req = HttpRequestEvent::from_json_str(r#"{"httpMethod":"get"}"#).unwrap();
        assert_eq!(req.method(), "GET");
    }

    #[test]
    fn try_from_value() {
        let req = HttpRequestEvent::try_from(json!({"httpMethod": "HEAD"})).unwrap();
        assert_eq!(req.method(), "HEAD");
    }

    #[test]
    fn raw_event_is_kept_unchanged() {
        let value = json!({"httpMethod": "get", "headers": {"X-A": "1"}});
        let req = request(value.clone());
        assert_eq!(req.raw_event().as_value(), &value);
    }
}
